use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{event, Level};
use warp::Filter;

mod endpoints;

use endpoints::{
    auth::auth_endpoint, connectors::connectors_endpoint, ledgers::ledgers_endpoint,
    oauth_clients::oauth_clients_endpoint, overview::overview_endpoint,
    webhooks::webhooks_endpoint,
};

use super::encoding::error::handle_reject;
use super::encoding::{self, Page};
use super::Context;

/// Paths no endpoint serves still pass the gate, so a signed out visitor is
/// sent to login before being told the page does not exist.
fn unknown(
    ctx: Arc<Context>,
) -> impl Filter<Extract = (warp::reply::Response,), Error = warp::Rejection> + Clone {
    encoding::page(ctx)
        .and_then(|_: Page| async { Err::<warp::reply::Response, _>(warp::reject::not_found()) })
}

#[derive(Debug)]
pub struct Server {
    context: Arc<Context>,
}

impl Server {
    pub fn new(context: Arc<Context>) -> Self {
        Self {
            context: Arc::clone(&context),
        }
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone + Send + Sync + 'static {
        let ctx = self.context.clone();
        let recover_ctx = ctx.clone();

        auth_endpoint(ctx.clone())
            .or(overview_endpoint(ctx.clone()))
            .or(connectors_endpoint(ctx.clone()))
            .or(oauth_clients_endpoint(ctx.clone()))
            .or(webhooks_endpoint(ctx.clone()))
            .or(ledgers_endpoint(ctx.clone()))
            .or(unknown(ctx))
            .recover(move |err| handle_reject(recover_ctx.clone(), err))
            .with(warp::log("console-http"))
    }

    pub async fn serve(self, addr: SocketAddr) {
        let routes = self.routes();
        event!(Level::INFO, %addr, "Console listening");
        warp::serve(routes).run(addr).await;
    }
}
