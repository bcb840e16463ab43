/// OAuth 2.0 error body, as returned by the identity provider's token
/// endpoint and by the console's own `/auth/refresh`.
#[derive(Debug, Clone, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "error")]
    pub kind: ErrorKind,
    #[serde(rename = "error_description")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ErrorResponse {
    pub fn new(kind: ErrorKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: Some(description.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    InvalidClient,
    InvalidGrant,
    UnauthorizedClient,
    InvalidScope,
    ServerError,
    TemporarilyUnavailable,
    #[serde(other)]
    Other,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session cookie is not valid base64")]
    Encoding(#[from] base64::DecodeError),
    #[error("session cookie is too short to hold a nonce")]
    Truncated,
    #[error("session cookie failed authentication")]
    Cipher,
    #[error("session payload is malformed: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("state is not valid base64")]
    Encoding(#[from] base64::DecodeError),
    #[error("state payload is malformed: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("refresh request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("refresh endpoint answered {0}")]
    Status(u16),
    #[error("refresh response is not usable: {0}")]
    Body(String),
}
