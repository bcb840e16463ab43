#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend answered {0}")]
    Status(u16),
    #[error("backend payload is malformed: {0}")]
    Body(#[from] serde_json::Error),
    #[error("request names no valid backend resource: {0}")]
    Url(#[from] crate::util::url::UrlError),
}

impl ApiError {
    /// Status code the error boundary reports for this failure.
    pub fn status(&self) -> u16 {
        match self {
            Self::Transport(e) if e.is_timeout() => 504,
            Self::Transport(_) => 502,
            Self::Status(status) => *status,
            Self::Body(_) => 500,
            Self::Url(_) => 400,
        }
    }
}
