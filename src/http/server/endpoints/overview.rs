use std::sync::Arc;

use warp::Filter;

use crate::http::encoding::{self, reply, Page};
use crate::http::Context;

pub fn overview_endpoint(
    ctx: Arc<Context>,
) -> impl warp::Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let with_context = encoding::with_context(ctx.clone());

    warp::path::end()
        .or(warp::path!("overview"))
        .unify()
        .and(warp::get())
        .and(encoding::page(ctx))
        .and(with_context)
        .and_then(|page: Page, ctx: Arc<Context>| async move {
            let body = ctx
                .renderer
                .page(page.frame("Overview"), "overview", &serde_json::json!({}));
            reply::render(body, 200)
        })
}
