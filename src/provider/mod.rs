use std::time::Duration;

use tracing::{event, Level};

use crate::api::{ApiClient, Endpoints};
use crate::auth::refresh::{RefreshInterval, MIN_INTERVAL_MS};
use crate::auth::{SessionCodec, State, AUTH_CALLBACK_ROUTE};
use crate::core::types::{ClientId, ClientSecret, RedirectUri, Scope};
use crate::oidc::DiscoveryClient;
use crate::util::url::append_params;

pub mod error;
pub mod gate;
pub mod token;

use error::{LoginError, SessionRefreshError};
pub use gate::GateOutcome;
use token::TokenClient;

pub const DEFAULT_SCOPE: &str = "openid email offline_access";

/// Access token lifetime assumed when the provider does not say.
const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct Settings {
    pub client_id: ClientId,
    pub client_secret: Option<ClientSecret>,
    pub origin: RedirectUri,
    pub issuer: String,
    pub api: Endpoints,
    pub scope: Scope,
    pub secure_cookies: bool,
    pub discovery_ttl: Duration,
    pub http_timeout: Duration,
}

/// Everything a page request needs: session sealing, the identity provider,
/// and the backend client factory.
#[derive(Debug)]
pub struct Console {
    settings: Settings,
    codec: SessionCodec,
    discovery: DiscoveryClient,
    token: TokenClient,
    http: reqwest::Client,
}

/// A freshly sealed session and where to go next.
#[derive(Debug)]
pub struct LoginCompleted {
    pub cookie: String,
    pub redirect_to: String,
}

#[derive(Debug)]
pub struct SessionRefreshed {
    pub cookie: String,
    pub interval: RefreshInterval,
}

#[derive(Debug, serde::Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(serde::Serialize)]
struct EndSessionParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id_token_hint: Option<&'a str>,
    post_logout_redirect_uri: &'a str,
}

impl Console {
    pub fn new(settings: Settings, encryption_key: &str) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(settings.http_timeout)
            .build()?;
        let discovery = DiscoveryClient::new(http.clone(), &settings.issuer, settings.discovery_ttl);
        let token = TokenClient::new(
            http.clone(),
            settings.client_id.clone(),
            settings.client_secret.clone(),
        );
        if !settings.scope.has_refresh() {
            event!(
                Level::WARN,
                scope = %settings.scope.as_joined(),
                "No offline_access scope, sessions will end when the access token expires"
            );
        }

        Ok(Self {
            codec: SessionCodec::new(encryption_key),
            settings,
            discovery,
            token,
            http,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn api(&self, auth: &crate::auth::Authentication) -> ApiClient {
        ApiClient::new(self.http.clone(), auth)
    }

    /// Handles the identity provider's redirect back to the console.
    #[tracing::instrument(skip_all)]
    pub async fn complete_login(&self, params: CallbackParams) -> Result<LoginCompleted, LoginError> {
        if let Some(error) = params.error {
            let description = params.error_description.unwrap_or_default();
            event!(Level::WARN, error = %error, description = %description, "Login refused");
            return Err(LoginError::Denied(error));
        }
        let code = params.code.ok_or(LoginError::MissingCode)?;

        let config = self.discovery.fetch().await?;
        let redirect_uri = self.settings.origin.join(AUTH_CALLBACK_ROUTE);
        let auth = self.token.exchange_code(&config, &code, &redirect_uri).await?;
        let cookie = self.codec.encrypt(&auth)?;

        let redirect_to = params
            .state
            .as_deref()
            .and_then(|s| match State::decode(s) {
                Ok(state) => Some(state.local_target().to_string()),
                Err(e) => {
                    event!(Level::WARN, error = %e, "Undecodable login state");
                    None
                }
            })
            .unwrap_or_else(|| "/".to_string());

        event!(Level::INFO, redirect_to = %redirect_to, "Session opened");
        Ok(LoginCompleted { cookie, redirect_to })
    }

    /// Refreshes the session's tokens and tells the page when to come back.
    #[tracing::instrument(skip_all)]
    pub async fn refresh_session(&self, cookie: Option<&str>) -> Result<SessionRefreshed, SessionRefreshError> {
        let cookie = cookie
            .filter(|c| !c.is_empty())
            .ok_or(SessionRefreshError::MissingSession)?;
        let auth = self.codec.decrypt(cookie)?;
        let refresh_token = auth
            .refresh_token
            .clone()
            .ok_or(SessionRefreshError::NoRefreshToken)?;

        let config = self.discovery.fetch().await?;
        let refreshed = self.token.refresh(&config, &auth, &refresh_token).await?;
        let interval = refresh_interval(refreshed.expires_in);

        Ok(SessionRefreshed {
            cookie: self.codec.encrypt(&refreshed)?,
            interval,
        })
    }

    /// Where to send the browser once the session cookie is cleared.
    #[tracing::instrument(skip_all)]
    pub async fn logout_url(&self, cookie: Option<&str>) -> String {
        let home = self.settings.origin.join("/");
        let config = match self.discovery.fetch().await {
            Ok(config) => config,
            Err(e) => {
                event!(Level::WARN, error = %e, "Logging out without the identity provider");
                return home;
            }
        };
        let end_session = match config.end_session_endpoint.as_deref() {
            Some(endpoint) => endpoint,
            None => return home,
        };

        let id_token = cookie
            .and_then(|c| self.codec.decrypt(c).ok())
            .and_then(|auth| auth.id_token);
        let params = EndSessionParams {
            id_token_hint: id_token.as_ref().map(|t| t.0.as_str()),
            post_logout_redirect_uri: &home,
        };

        match append_params(end_session, params) {
            Ok(url) => url.to_string(),
            Err(e) => {
                event!(Level::WARN, error = %e, "Unusable end session endpoint");
                home
            }
        }
    }
}

/// Half the token lifetime, so the page refreshes well before expiry.
pub fn refresh_interval(expires_in: Option<u64>) -> RefreshInterval {
    let secs = expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
    RefreshInterval {
        interval: (secs.saturating_mul(1000) / 2).max(MIN_INTERVAL_MS),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::error::SessionError;
    use crate::auth::Authentication;
    use crate::core::types::{AccessToken, IdToken, RefreshToken};
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(crate) async fn mount_discovery(idp: &MockServer) {
        Mock::given(path("/.well-known/openid-configuration"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "issuer": idp.uri(),
                "authorization_endpoint": format!("{}/authorize", idp.uri()),
                "token_endpoint": format!("{}/oauth/token", idp.uri()),
                "end_session_endpoint": format!("{}/logout", idp.uri()),
            })))
            .mount(idp)
            .await;
    }

    pub(crate) fn settings(issuer: &str, api_url: &str) -> Settings {
        Settings {
            client_id: ClientId("console".to_string()),
            client_secret: Some(ClientSecret("s3cret".to_string())),
            origin: RedirectUri::new("https://console.example.com"),
            issuer: issuer.to_string(),
            api: Endpoints::new(api_url),
            scope: Scope::from_delimited_parts(DEFAULT_SCOPE),
            secure_cookies: false,
            discovery_ttl: Duration::from_secs(300),
            http_timeout: Duration::from_secs(5),
        }
    }

    pub(crate) fn console(idp: &MockServer, api_url: &str) -> Console {
        Console::new(settings(&idp.uri(), api_url), "test encryption key").unwrap()
    }

    pub(crate) fn seal(console: &Console, auth: &Authentication) -> String {
        console.codec.encrypt(auth).unwrap()
    }

    fn auth() -> Authentication {
        Authentication {
            access_token: AccessToken("at".to_string()),
            refresh_token: Some(RefreshToken("rt".to_string())),
            id_token: Some(IdToken("it".to_string())),
            expires_in: Some(600),
        }
    }

    #[test]
    fn refresh_interval_is_half_the_lifetime_with_a_floor() {
        assert_eq!(refresh_interval(Some(600)).interval, 300_000);
        assert_eq!(refresh_interval(None).interval, 1_800_000);
        assert_eq!(refresh_interval(Some(4)).interval, 10_000);
    }

    #[tokio::test]
    async fn login_exchanges_the_code_and_restores_the_location() {
        let idp = MockServer::start().await;
        mount_discovery(&idp).await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_string_contains("code=the-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at", "refresh_token": "rt", "expires_in": 600
            })))
            .expect(1)
            .mount(&idp)
            .await;
        let console = console(&idp, "https://api.example.com");

        let state = State::new("/connectors/webhooks", "").encode().unwrap();
        let done = console
            .complete_login(CallbackParams {
                code: Some("the-code".to_string()),
                state: Some(state),
                error: None,
                error_description: None,
            })
            .await
            .unwrap();

        assert_eq!(done.redirect_to, "/connectors/webhooks");
        let opened = console.codec.decrypt(&done.cookie).unwrap();
        assert_eq!(opened.access_token.0, "at");
    }

    #[tokio::test]
    async fn login_errors_from_the_provider_are_refusals() {
        let idp = MockServer::start().await;
        let console = console(&idp, "https://api.example.com");
        let result = console
            .complete_login(CallbackParams {
                code: None,
                state: None,
                error: Some("access_denied".to_string()),
                error_description: None,
            })
            .await;
        assert!(matches!(result, Err(LoginError::Denied(e)) if e == "access_denied"));
    }

    #[tokio::test]
    async fn refresh_reseals_the_session_and_computes_the_interval() {
        let idp = MockServer::start().await;
        mount_discovery(&idp).await;
        Mock::given(method("POST"))
            .and(body_string_contains("refresh_token=rt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at2", "expires_in": 120
            })))
            .mount(&idp)
            .await;
        let console = console(&idp, "https://api.example.com");

        let cookie = seal(&console, &auth());
        let refreshed = console.refresh_session(Some(&cookie)).await.unwrap();
        assert_eq!(refreshed.interval.interval, 60_000);
        let opened = console.codec.decrypt(&refreshed.cookie).unwrap();
        assert_eq!(opened.access_token.0, "at2");
        assert_eq!(opened.refresh_token, Some(RefreshToken("rt".to_string())));
    }

    #[tokio::test]
    async fn refresh_without_a_usable_session_fails() {
        let idp = MockServer::start().await;
        let console = console(&idp, "https://api.example.com");
        assert!(matches!(
            console.refresh_session(None).await,
            Err(SessionRefreshError::MissingSession)
        ));
        assert!(matches!(
            console.refresh_session(Some("nope")).await,
            Err(SessionRefreshError::Session(SessionError::Cipher))
                | Err(SessionRefreshError::Session(SessionError::Encoding(_)))
                | Err(SessionRefreshError::Session(SessionError::Truncated))
        ));
    }

    #[tokio::test]
    async fn logout_goes_through_the_end_session_endpoint() {
        let idp = MockServer::start().await;
        mount_discovery(&idp).await;
        let console = console(&idp, "https://api.example.com");

        let cookie = seal(&console, &auth());
        let url = Url::parse(&console.logout_url(Some(&cookie)).await).unwrap();
        assert_eq!(url.path(), "/logout");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("id_token_hint".to_string(), "it".to_string())));
        assert!(pairs.contains(&(
            "post_logout_redirect_uri".to_string(),
            "https://console.example.com/".to_string()
        )));
    }

    #[tokio::test]
    async fn logout_falls_back_home_when_discovery_fails() {
        let idp = MockServer::start().await;
        let console = console(&idp, "https://api.example.com");
        assert_eq!(console.logout_url(None).await, "https://console.example.com/");
    }
}
