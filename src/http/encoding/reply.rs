use cookie::Cookie;
use warp::http::header::{HeaderValue, SET_COOKIE};
use warp::http::StatusCode;
use warp::reply::{Reply, Response};
use warp::Rejection;

use super::error::ConsoleRejection;
use crate::view::ViewError;

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

pub fn html(body: String, status: u16) -> Response {
    warp::reply::with_status(warp::reply::html(body), status_code(status)).into_response()
}

pub fn json<T: serde::Serialize>(body: &T, status: u16) -> Response {
    warp::reply::with_status(warp::reply::json(body), status_code(status)).into_response()
}

pub fn with_cookie(mut response: Response, cookie: Cookie<'_>) -> Response {
    if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
        response.headers_mut().append(SET_COOKIE, value);
    }
    response
}

pub fn accept<T, E>(result: Result<T, E>) -> Result<T, Rejection>
where
    E: Into<ConsoleRejection>,
{
    result.map_err(|e| warp::reject::custom(e.into()))
}

/// A rendered page, or the top-level boundary when rendering failed.
pub fn render(page: Result<String, ViewError>, status: u16) -> Result<Response, Rejection> {
    accept(page).map(|body| html(body, status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_statuses_fall_back_to_500() {
        assert_eq!(html(String::new(), 1000).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(html(String::new(), 418).status(), StatusCode::IM_A_TEAPOT);
    }
}
