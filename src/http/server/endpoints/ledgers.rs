use std::sync::Arc;

use warp::Filter;

use super::connectors::ListPage;
use crate::api::{sanitize_query, ApiError, Unwrap};
use crate::core::models::{Cursor, LedgerLog};
use crate::core::types::LedgerId;
use crate::http::encoding::{self, reply, Page};
use crate::http::Context;
use crate::util::url::join_segments;
use crate::view::boundary::RouteBoundary;
use crate::view::lists::{ledger_log_columns, LedgerLogRows, LEDGER_LOGS_TABLE};
use crate::view::table::{Pagination, Table};

pub const LEDGER_LOGS_BOUNDARY: RouteBoundary = RouteBoundary::titled("ledger-logs", "Logs");

pub fn ledgers_endpoint(
    ctx: Arc<Context>,
) -> impl warp::Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let with_context = encoding::with_context(ctx.clone());

    warp::path!("ledgers" / LedgerId / "logs")
        .and(warp::get())
        .and(encoding::page(ctx))
        .and(with_context)
        .and_then(|ledger: LedgerId, page: Page, ctx: Arc<Context>| async move {
            let query = sanitize_query(&page.query);
            let mut url = page.load(
                LEDGER_LOGS_BOUNDARY,
                join_segments(&ctx.console.settings().api.ledger, [ledger.0.as_str(), "logs"])
                    .map_err(ApiError::from),
            )?;
            if !query.is_empty() {
                url.set_query(Some(&query));
            }

            let cursor = page.load(
                LEDGER_LOGS_BOUNDARY,
                page.api(&ctx).get_resource::<Cursor<LedgerLog>>(url.as_str(), Unwrap::Cursor).await,
            )?;

            let (logs, pagination) = match &cursor {
                Some(cursor) => (Some(cursor.data.as_slice()), Pagination::from_cursor(cursor, &page.path)),
                None => (None, Pagination::Disabled),
            };
            let table = Table::new(LEDGER_LOGS_TABLE, ledger_log_columns(), logs)
                .with_pagination(pagination)
                .render(&LedgerLogRows { ledger: &ledger });

            reply::render(ctx.renderer.page(page.frame(&ledger.0), "list", &ListPage { table }), 200)
        })
}
