pub mod error;
pub mod reply;

use std::convert::Infallible;
use std::sync::Arc;

use warp::path::FullPath;
use warp::{Filter, Rejection};

use self::error::{ConsoleRejection, LoaderRejection};
use super::Context;
use crate::api::{ApiClient, ApiError};
use crate::auth::{Session, COOKIE_NAME};
use crate::provider::GateOutcome;
use crate::view::boundary::RouteBoundary;
use crate::view::Frame;

pub fn with_context(
    ctx: Arc<Context>,
) -> impl Filter<Extract = (Arc<Context>,), Error = Infallible> + Clone {
    warp::any().map(move || ctx.clone())
}

/// The raw query string, empty when the request has none.
pub fn raw_query() -> impl Filter<Extract = (String,), Error = Rejection> + Clone {
    warp::query::raw().or_else(|_| async { Ok::<_, Rejection>((String::new(),)) })
}

pub fn session_cookie() -> impl Filter<Extract = (Option<String>,), Error = Infallible> + Clone {
    warp::cookie::optional::<String>(COOKIE_NAME)
}

/// An authenticated page request.
#[derive(Debug, Clone)]
pub struct Page {
    pub session: Session,
    pub path: String,
    pub query: String,
}

impl Page {
    pub fn frame<'a>(&'a self, title: &'a str) -> Frame<'a> {
        self.frame_at(title, &self.path)
    }

    /// A frame for a page served under another path, as after a form post.
    pub fn frame_at<'a>(&'a self, title: &'a str, path: &'a str) -> Frame<'a> {
        Frame {
            title,
            path,
            root: &self.session.root,
        }
    }

    pub fn api(&self, ctx: &Context) -> ApiClient {
        ctx.console.api(&self.session.auth)
    }

    /// Hands a loader failure to the page's boundary.
    pub fn load<T>(&self, boundary: RouteBoundary, result: Result<T, ApiError>) -> Result<T, Rejection> {
        result.map_err(|e| self.reject(boundary, e))
    }

    pub fn reject(&self, boundary: RouteBoundary, error: ApiError) -> Rejection {
        warp::reject::custom(LoaderRejection::from_api(
            boundary,
            error,
            &self.path,
            &self.session.root,
        ))
    }
}

/// The auth gate. Runs after path matching so that only page routes require a
/// session, and before any loader.
pub fn page(ctx: Arc<Context>) -> impl Filter<Extract = (Page,), Error = Rejection> + Clone {
    gate(ctx, None)
}

/// The auth gate for a form submission. The form's own path only accepts
/// posts, so a login started here returns to `return_to` instead.
pub fn form_page(
    ctx: Arc<Context>,
    return_to: &'static str,
) -> impl Filter<Extract = (Page,), Error = Rejection> + Clone {
    gate(ctx, Some(return_to))
}

fn gate(
    ctx: Arc<Context>,
    return_to: Option<&'static str>,
) -> impl Filter<Extract = (Page,), Error = Rejection> + Clone {
    warp::path::full()
        .and(raw_query())
        .and(session_cookie())
        .and(with_context(ctx))
        .and_then(
            move |path: FullPath, query: String, cookie: Option<String>, ctx: Arc<Context>| async move {
                let (target, target_query) = match return_to {
                    Some(route) => (route, ""),
                    None => (path.as_str(), query.as_str()),
                };
                let outcome = ctx.console.gate(target, target_query, cookie.as_deref()).await;
                match reply::accept(outcome)? {
                    GateOutcome::Session(session) => Ok(Page {
                        session,
                        path: path.as_str().to_string(),
                        query,
                    }),
                    GateOutcome::Login { url, clear_cookie } => {
                        Err(warp::reject::custom(ConsoleRejection::Login { url, clear_cookie }))
                    }
                }
            },
        )
}
