use serde::Serialize;

use super::routes::OVERVIEW_ROUTE;
use crate::auth::LOGOUT_ROUTE;
use crate::core::types::RedirectUri;

/// What a failed request is shown as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorState {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Internal,
    BadGateway,
    ServiceUnavailable,
}

impl ErrorState {
    /// Unmapped statuses read as validation errors.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            500 => Self::Internal,
            502 => Self::BadGateway,
            503 => Self::ServiceUnavailable,
            _ => Self::Validation,
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Validation => 422,
            Self::Internal => 500,
            Self::BadGateway => 502,
            Self::ServiceUnavailable => 503,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::BadRequest => "badRequest",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "notFound",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::BadGateway => "badGateway",
            Self::ServiceUnavailable => "serviceUnavailable",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::BadRequest => "Bad request",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not found",
            Self::Validation => "Something is wrong with the request",
            Self::Internal => "Internal error",
            Self::BadGateway => "A service did not answer correctly",
            Self::ServiceUnavailable => "Service unavailable",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::BadRequest => "The request could not be understood.",
            Self::Unauthorized => "Your session is not allowed to see this page.",
            Self::Forbidden => "You do not have access to this resource.",
            Self::NotFound => "This resource does not exist.",
            Self::Validation => "The data sent or received could not be validated.",
            Self::Internal => "An unexpected error occurred.",
            Self::BadGateway => "An upstream service returned an invalid answer.",
            Self::ServiceUnavailable => "An upstream service is unavailable, try again later.",
        }
    }

    pub fn view(&self) -> ErrorView {
        ErrorView {
            key: self.key(),
            status: self.status(),
            title: self.title(),
            description: self.description(),
        }
    }
}

/// Template data for an error.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorView {
    pub key: &'static str,
    pub status: u16,
    pub title: &'static str,
    pub description: &'static str,
}

/// Error handling attached to one page: its loader's failures render in
/// place of the page body, inside the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteBoundary {
    pub id: &'static str,
    pub title: Option<&'static str>,
    pub show_action: bool,
}

impl RouteBoundary {
    pub const fn new(id: &'static str) -> Self {
        Self {
            id,
            title: None,
            show_action: false,
        }
    }

    pub const fn titled(id: &'static str, title: &'static str) -> Self {
        Self {
            id,
            title: Some(title),
            show_action: false,
        }
    }

    /// Adds a link back to the overview under the error, for pages reached
    /// from a list rather than the sidebar.
    pub const fn with_action(self) -> Self {
        Self {
            show_action: true,
            ..self
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteErrorView {
    pub boundary: RouteBoundary,
    pub error: ErrorView,
    pub back_url: &'static str,
}

impl RouteErrorView {
    pub fn new(boundary: RouteBoundary, state: ErrorState) -> Self {
        Self {
            boundary,
            error: state.view(),
            back_url: OVERVIEW_ROUTE,
        }
    }
}

/// Full page shown when no layout can be rendered around the error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopLevelErrorView {
    pub error: ErrorView,
    pub back_url: &'static str,
    pub logout_url: String,
}

impl TopLevelErrorView {
    pub fn new(state: ErrorState, origin: &RedirectUri) -> Self {
        Self {
            error: state.view(),
            back_url: OVERVIEW_ROUTE,
            logout_url: origin.join(LOGOUT_ROUTE),
        }
    }
}
