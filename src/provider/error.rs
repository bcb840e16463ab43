use crate::auth::error::{ErrorResponse, SessionError, StateError};
use crate::oidc::DiscoveryError;
use crate::util::url::UrlError;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("token request rejected: {0:?}")]
    Rejected(ErrorResponse),
    #[error("token endpoint answered {0}")]
    Status(u16),
    #[error("token response is malformed: {0}")]
    Body(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error("could not encode login state: {0}")]
    State(#[from] StateError),
    #[error("could not build the authorization URL: {0}")]
    Url(#[from] UrlError),
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("identity provider refused the login: {0}")]
    Denied(String),
    #[error("callback carries no authorization code")]
    MissingCode,
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("could not seal the session: {0}")]
    Session(#[from] SessionError),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionRefreshError {
    #[error("no session cookie")]
    MissingSession,
    #[error("session cookie is unusable: {0}")]
    Session(#[from] SessionError),
    #[error("session holds no refresh token")]
    NoRefreshToken,
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Token(#[from] TokenError),
}
