use tracing::{event, Level};

use super::error::GateError;
use super::Console;
use crate::auth::{claims, Metas, RootContext, Session, State, AUTH_CALLBACK_ROUTE};
use crate::oidc::OpenIdConfig;
use crate::util::url::append_params;

/// Result of running the auth gate for one page request.
#[derive(Debug)]
pub enum GateOutcome {
    /// Send the browser to the identity provider. `clear_cookie` is set when
    /// the request carried a session cookie we could not open.
    Login { url: String, clear_cookie: bool },
    Session(Session),
}

#[derive(serde::Serialize)]
struct AuthorizationParams<'a> {
    client_id: &'a str,
    redirect_uri: String,
    state: String,
    response_type: &'static str,
    scope: String,
}

impl Console {
    /// Runs before every page loader: either an authenticated context or a
    /// login redirect carrying the current location in `state`.
    #[tracing::instrument(skip(self, cookie))]
    pub async fn gate(
        &self,
        path: &str,
        query: &str,
        cookie: Option<&str>,
    ) -> Result<GateOutcome, GateError> {
        let open_id_config = self.discovery.fetch().await?;

        let cookie = match cookie {
            Some(c) if !c.is_empty() => c,
            _ => {
                event!(Level::DEBUG, "No session cookie, redirecting to login");
                let url = self.authorization_url(&open_id_config, path, query)?;
                return Ok(GateOutcome::Login {
                    url,
                    clear_cookie: false,
                });
            }
        };

        let auth = match self.codec.decrypt(cookie) {
            Ok(auth) => auth,
            Err(e) => {
                event!(Level::WARN, error = %e, "Unusable session cookie, redirecting to login");
                let url = self.authorization_url(&open_id_config, path, query)?;
                return Ok(GateOutcome::Login {
                    url,
                    clear_cookie: true,
                });
            }
        };

        let root = RootContext {
            current_user: claims::current_user(&auth),
            metas: Metas {
                origin: self.settings.origin.clone(),
                open_id_config,
            },
        };
        Ok(GateOutcome::Session(Session { root, auth }))
    }

    pub fn authorization_url(
        &self,
        config: &OpenIdConfig,
        path: &str,
        query: &str,
    ) -> Result<String, GateError> {
        let state = State::new(path, query).encode()?;
        let params = AuthorizationParams {
            client_id: &self.settings.client_id.0,
            redirect_uri: self.settings.origin.join(AUTH_CALLBACK_ROUTE),
            state,
            response_type: "code",
            scope: self.settings.scope.as_joined(),
        };

        let url = append_params(&config.authorization_endpoint, params)?;
        Ok(url.to_string())
    }
}
