use cookie::Cookie;
use tracing::{event, Level};
use warp::http::header::{HeaderValue, LOCATION, SET_COOKIE};
use warp::http::StatusCode;
use warp::reply::{Reply, Response};

/// `302 Found` to `location`, optionally setting cookies on the way.
#[derive(Debug, Clone)]
pub struct Redirect {
    location: String,
    cookies: Vec<Cookie<'static>>,
}

impl Redirect {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            cookies: Vec::new(),
        }
    }

    pub fn with_cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.cookies.push(cookie);
        self
    }
}

impl Reply for Redirect {
    fn into_response(self) -> Response {
        let mut response = Response::new(warp::hyper::Body::empty());
        match HeaderValue::from_str(&self.location) {
            Ok(location) => {
                *response.status_mut() = StatusCode::FOUND;
                response.headers_mut().insert(LOCATION, location);
            }
            Err(_) => {
                event!(Level::ERROR, location = %self.location, "Redirect target is not a valid header");
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                return response;
            }
        }
        for cookie in self.cookies {
            if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
        response
    }
}
