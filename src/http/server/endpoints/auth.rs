use std::sync::Arc;

use tracing::{event, Level};
use warp::Filter;

use crate::auth::error::{ErrorKind, ErrorResponse};
use crate::auth::session::{clear_session_cookie, session_cookie};
use crate::http::encoding::{self, reply};
use crate::http::response::Redirect;
use crate::http::Context;
use crate::provider::error::SessionRefreshError;
use crate::provider::CallbackParams;

fn refresh_error(error: &SessionRefreshError) -> ErrorResponse {
    let kind = match error {
        SessionRefreshError::MissingSession | SessionRefreshError::Session(_) => ErrorKind::InvalidRequest,
        SessionRefreshError::NoRefreshToken | SessionRefreshError::Token(_) => ErrorKind::InvalidGrant,
        SessionRefreshError::Discovery(_) => ErrorKind::TemporarilyUnavailable,
    };
    ErrorResponse::new(kind, error.to_string())
}

pub fn auth_endpoint(
    ctx: Arc<Context>,
) -> impl warp::Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let with_context = encoding::with_context(ctx);

    let login = warp::path!("login")
        .and(warp::get())
        .and(with_context.clone())
        .and(warp::query::<CallbackParams>())
        .and_then(|ctx: Arc<Context>, params: CallbackParams| async move {
            let done = reply::accept(ctx.console.complete_login(params).await)?;
            let secure = ctx.console.settings().secure_cookies;
            Ok::<_, warp::Rejection>(
                Redirect::new(done.redirect_to).with_cookie(session_cookie(done.cookie, secure)),
            )
        });

    let refresh = warp::path!("refresh")
        .and(warp::get())
        .and(with_context.clone())
        .and(encoding::session_cookie())
        .and_then(|ctx: Arc<Context>, cookie: Option<String>| async move {
            let response = match ctx.console.refresh_session(cookie.as_deref()).await {
                Ok(refreshed) => {
                    let secure = ctx.console.settings().secure_cookies;
                    reply::with_cookie(
                        reply::json(&refreshed.interval, 200),
                        session_cookie(refreshed.cookie, secure),
                    )
                }
                Err(e) => {
                    event!(Level::INFO, error = %e, "Session refresh refused");
                    reply::json(&refresh_error(&e), 401)
                }
            };
            Ok::<_, warp::Rejection>(response)
        });

    let logout = warp::path!("redirect-logout")
        .and(warp::get())
        .and(with_context)
        .and(encoding::session_cookie())
        .and_then(|ctx: Arc<Context>, cookie: Option<String>| async move {
            let url = ctx.console.logout_url(cookie.as_deref()).await;
            event!(Level::INFO, "Session closed");
            Ok::<_, warp::Rejection>(Redirect::new(url).with_cookie(clear_session_cookie()))
        });

    warp::path("auth").and(login.or(refresh).or(logout))
}
