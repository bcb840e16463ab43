use std::sync::Arc;

use tracing::{event, Level};
use warp::http::StatusCode;
use warp::reply::{Reply, Response};
use warp::Rejection;

use super::reply;
use crate::api::ApiError;
use crate::auth::session::clear_session_cookie;
use crate::auth::RootContext;
use crate::http::response::Redirect;
use crate::http::Context;
use crate::provider::error::{GateError, LoginError};
use crate::view::boundary::{ErrorState, RouteBoundary};
use crate::view::{Frame, ViewError};

/// Failures handled by the top-level boundary, plus the login redirect.
#[derive(Debug)]
pub enum ConsoleRejection {
    Login { url: String, clear_cookie: bool },
    Failed { state: ErrorState, reason: String },
}

impl warp::reject::Reject for ConsoleRejection {}

impl ConsoleRejection {
    pub fn failed(state: ErrorState, reason: impl ToString) -> Self {
        Self::Failed {
            state,
            reason: reason.to_string(),
        }
    }
}

impl From<GateError> for ConsoleRejection {
    fn from(error: GateError) -> Self {
        let state = match error {
            GateError::Discovery(_) => ErrorState::BadGateway,
            GateError::State(_) | GateError::Url(_) => ErrorState::Internal,
        };
        Self::failed(state, error)
    }
}

impl From<LoginError> for ConsoleRejection {
    fn from(error: LoginError) -> Self {
        Self::failed(ErrorState::Unauthorized, error)
    }
}

impl From<ViewError> for ConsoleRejection {
    fn from(error: ViewError) -> Self {
        Self::failed(ErrorState::Internal, error)
    }
}

/// A page loader failed; rendered inside the layout by the page's boundary.
#[derive(Debug)]
pub struct LoaderRejection {
    pub boundary: RouteBoundary,
    pub status: u16,
    pub reason: String,
    pub path: String,
    pub root: RootContext,
}

impl warp::reject::Reject for LoaderRejection {}

impl LoaderRejection {
    pub fn from_api(boundary: RouteBoundary, error: ApiError, path: &str, root: &RootContext) -> Self {
        Self {
            boundary,
            status: error.status(),
            reason: error.to_string(),
            path: path.to_string(),
            root: root.clone(),
        }
    }

    pub fn state(&self) -> ErrorState {
        ErrorState::from_status(self.status)
    }
}

fn error_page(ctx: &Context, state: ErrorState) -> Response {
    let origin = &ctx.console.settings().origin;
    match ctx.renderer.error_page(state, origin) {
        Ok(body) => reply::html(body, state.status()),
        Err(e) => {
            event!(Level::ERROR, error = %e, "Could not render the error page");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn route_error(ctx: &Context, rejection: &LoaderRejection) -> Response {
    let state = rejection.state();
    let frame = Frame {
        title: rejection.boundary.title.unwrap_or_else(|| state.title()),
        path: &rejection.path,
        root: &rejection.root,
    };
    match ctx.renderer.route_error(frame, rejection.boundary, state) {
        Ok(body) => reply::html(body, rejection.status),
        Err(e) => {
            event!(Level::ERROR, error = %e, "Could not render the route error");
            error_page(ctx, state)
        }
    }
}

pub async fn handle_reject(ctx: Arc<Context>, err: Rejection) -> Result<Response, Rejection> {
    if let Some(rejection) = err.find::<ConsoleRejection>() {
        return Ok(match rejection {
            ConsoleRejection::Login { url, clear_cookie } => {
                let redirect = Redirect::new(url.clone());
                if *clear_cookie {
                    redirect.with_cookie(clear_session_cookie()).into_response()
                } else {
                    redirect.into_response()
                }
            }
            ConsoleRejection::Failed { state, reason } => {
                event!(Level::ERROR, state = state.key(), reason = %reason, "Request failed");
                error_page(&ctx, *state)
            }
        });
    }

    if let Some(rejection) = err.find::<LoaderRejection>() {
        event!(
            Level::WARN,
            boundary = rejection.boundary.id,
            status = rejection.status,
            reason = %rejection.reason,
            "Loader failed"
        );
        return Ok(route_error(&ctx, rejection));
    }

    let state = if err.is_not_found() {
        ErrorState::NotFound
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        ErrorState::from_status(StatusCode::METHOD_NOT_ALLOWED.as_u16())
    } else if err.find::<warp::reject::InvalidQuery>().is_some()
        || err.find::<warp::filters::body::BodyDeserializeError>().is_some()
        || err.find::<warp::reject::PayloadTooLarge>().is_some()
    {
        ErrorState::BadRequest
    } else {
        ErrorState::Internal
    };
    event!(Level::WARN, state = state.key(), rejection = ?err, "Unhandled rejection");
    Ok(error_page(&ctx, state))
}
