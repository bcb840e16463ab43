use std::sync::Arc;

use serde::{Deserialize, Serialize};
use warp::Filter;

use super::connectors::ListPage;
use crate::api::{ApiError, Unwrap};
use crate::core::models::{Cursor, ResourceList, Webhook};
use crate::http::encoding::{self, reply, Page};
use crate::http::Context;
use crate::util::url::join_segments;
use crate::view::boundary::RouteBoundary;
use crate::view::lists::{webhook_columns, WebhookRows, WEBHOOKS_TABLE};
use crate::view::routes::WEBHOOKS_ROUTE;
use crate::view::table::Table;

pub const WEBHOOKS_BOUNDARY: RouteBoundary = RouteBoundary::new("webhooks");
pub const WEBHOOK_BOUNDARY: RouteBoundary = RouteBoundary::titled("webhook", "Webhook").with_action();

const FORM_LIMIT: u64 = 1024;

/// Posted by a row's toggle button with the webhook's current state.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ToggleForm {
    pub active: bool,
}

impl ToggleForm {
    pub fn action(&self) -> &'static str {
        if self.active {
            "deactivate"
        } else {
            "activate"
        }
    }
}

#[derive(Serialize)]
struct DetailPage {
    webhooks: Vec<Webhook>,
}

// TODO: wire cursor pagination once the webhooks service pages its configs.
async fn list(page: &Page, ctx: &Context) -> Result<Vec<Webhook>, warp::Rejection> {
    let url = format!("{}/configs", ctx.console.settings().api.webhook);
    let cursor = page.load(
        WEBHOOKS_BOUNDARY,
        page.api(ctx).get_resource::<Cursor<Webhook>>(&url, Unwrap::Cursor).await,
    )?;
    Ok(cursor.map(|c| c.data).unwrap_or_default())
}

fn render_list(page: &Page, ctx: &Context, webhooks: &[Webhook]) -> Result<warp::reply::Response, warp::Rejection> {
    let table = Table::new(WEBHOOKS_TABLE, webhook_columns(), Some(webhooks)).render(&WebhookRows);
    reply::render(
        ctx.renderer
            .page(page.frame_at("Webhooks", WEBHOOKS_ROUTE), "list", &ListPage { table }),
        200,
    )
}

pub fn webhooks_endpoint(
    ctx: Arc<Context>,
) -> impl warp::Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let with_context = encoding::with_context(ctx.clone());

    let index = warp::path!("connectors" / "webhooks")
        .and(warp::get())
        .and(encoding::page(ctx.clone()))
        .and(with_context.clone())
        .and_then(|page: Page, ctx: Arc<Context>| async move {
            let webhooks = list(&page, &ctx).await?;
            render_list(&page, &ctx, &webhooks)
        });

    let toggle = warp::path!("connectors" / "webhooks" / String / "toggle")
        .and(warp::post())
        .and(encoding::form_page(ctx.clone(), WEBHOOKS_ROUTE))
        .and(with_context.clone())
        .and(warp::body::content_length_limit(FORM_LIMIT))
        .and(warp::body::form::<ToggleForm>())
        .and_then(|id: String, page: Page, ctx: Arc<Context>, form: ToggleForm| async move {
            let url = page.load(
                WEBHOOKS_BOUNDARY,
                join_segments(
                    &ctx.console.settings().api.webhook,
                    ["configs", id.as_str(), form.action()],
                )
                .map_err(ApiError::from),
            )?;
            page.load(
                WEBHOOKS_BOUNDARY,
                page.api(&ctx)
                    .put_resource::<serde_json::Value, _>(url.as_str(), &serde_json::json!({}), Unwrap::Data)
                    .await,
            )?;

            // The list may not reflect the change yet.
            let mut webhooks = ResourceList::new(list(&page, &ctx).await?);
            let active = !form.active;
            webhooks.update_by_id(&id, |webhook| webhook.active = active);
            render_list(&page, &ctx, webhooks.items())
        });

    let show = warp::path!("webhooks" / String)
        .and(warp::get())
        .and(encoding::page(ctx))
        .and(with_context)
        .and_then(|id: String, page: Page, ctx: Arc<Context>| async move {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair("id", &id)
                .finish();
            let url = format!("{}/configs?{}", ctx.console.settings().api.webhook, query);
            let cursor = page.load(
                WEBHOOK_BOUNDARY,
                page.api(&ctx).get_resource::<Cursor<Webhook>>(&url, Unwrap::Cursor).await,
            )?;

            let view = DetailPage {
                webhooks: cursor.map(|c| c.data).unwrap_or_default(),
            };
            reply::render(ctx.renderer.page(page.frame("Webhook"), "webhook", &view), 200)
        });

    index.or(toggle).or(show)
}
