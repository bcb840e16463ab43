use crate::core::types::{AccessToken, IdToken, RedirectUri, RefreshToken};
use crate::oidc::OpenIdConfig;

pub mod claims;
pub mod error;
pub mod refresh;
pub mod session;
pub mod state;

pub use session::{SessionCodec, COOKIE_NAME};
pub use state::State;

pub const AUTH_CALLBACK_ROUTE: &str = "/auth/login";
pub const REFRESH_ROUTE: &str = "/auth/refresh";
pub const LOGOUT_ROUTE: &str = "/auth/redirect-logout";

/// What the session cookie decrypts to.
#[derive(Debug, Clone, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Authentication {
    pub access_token: AccessToken,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<RefreshToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<IdToken>,
    /// Lifetime of the access token in seconds, as granted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

/// Per-request view of the session's scope claims.
#[derive(Debug, Clone, Default, PartialEq)]
#[derive(serde::Serialize)]
pub struct CurrentUser {
    pub scp: Vec<String>,
}

#[derive(Debug, Clone)]
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metas {
    pub origin: RedirectUri,
    pub open_id_config: OpenIdConfig,
}

/// Produced by the auth gate for every page.
#[derive(Debug, Clone)]
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootContext {
    pub current_user: CurrentUser,
    pub metas: Metas,
}

/// An authenticated page request: the gate's context plus the credentials the
/// route loader calls the backend with.
#[derive(Debug, Clone)]
pub struct Session {
    pub root: RootContext,
    pub auth: Authentication,
}
