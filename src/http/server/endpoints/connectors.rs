use std::sync::Arc;

use serde::Serialize;
use warp::Filter;

use super::oauth_clients::OAUTH_CLIENTS_BOUNDARY;
use crate::api::Unwrap;
use crate::core::models::{Connector, OAuthClient};
use crate::http::encoding::{self, reply, Page};
use crate::http::Context;
use crate::view::boundary::RouteBoundary;
use crate::view::lists::{
    connector_columns, oauth_client_columns, ConnectorRows, OAuthClientRows, CONNECTORS_TABLE,
    OAUTH_CLIENTS_TABLE,
};
use crate::view::table::{Table, TableView};

pub const APPS_BOUNDARY: RouteBoundary = RouteBoundary::new("apps");

#[derive(Serialize)]
pub struct ListPage {
    pub table: TableView,
}

pub fn connectors_endpoint(
    ctx: Arc<Context>,
) -> impl warp::Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let with_context = encoding::with_context(ctx.clone());

    let apps = warp::path!("apps")
        .and(warp::get())
        .and(encoding::page(ctx.clone()))
        .and(with_context.clone())
        .and_then(|page: Page, ctx: Arc<Context>| async move {
            let url = format!("{}/connectors", ctx.console.settings().api.payment);
            let connectors = page.load(
                APPS_BOUNDARY,
                page.api(&ctx).get_resource::<Vec<Connector>>(&url, Unwrap::Data).await,
            )?;

            let table = Table::new(CONNECTORS_TABLE, connector_columns(), connectors.as_deref())
                .render(&ConnectorRows);
            reply::render(ctx.renderer.page(page.frame("Apps"), "list", &ListPage { table }), 200)
        });

    let oauth_clients = warp::path!("oauth-clients")
        .and(warp::get())
        .and(encoding::page(ctx))
        .and(with_context)
        .and_then(|page: Page, ctx: Arc<Context>| async move {
            let url = format!("{}/clients", ctx.console.settings().api.auth);
            let clients = page.load(
                OAUTH_CLIENTS_BOUNDARY,
                page.api(&ctx).get_resource::<Vec<OAuthClient>>(&url, Unwrap::Data).await,
            )?;

            let table = Table::new(OAUTH_CLIENTS_TABLE, oauth_client_columns(), clients.as_deref())
                .render(&OAuthClientRows);
            reply::render(
                ctx.renderer.page(page.frame("OAuth clients"), "list", &ListPage { table }),
                200,
            )
        });

    warp::path("connectors").and(apps.or(oauth_clients))
}
