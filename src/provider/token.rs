use tracing::{event, Level};

use super::error::TokenError;
use crate::auth::error::ErrorResponse;
use crate::auth::Authentication;
use crate::core::types::{AccessToken, ClientId, ClientSecret, IdToken, RefreshToken};
use crate::oidc::{AccessTokenResponse, OpenIdConfig};

/// Talks to the identity provider's token endpoint on behalf of the console.
#[derive(Debug, Clone)]
pub struct TokenClient {
    http: reqwest::Client,
    client_id: ClientId,
    client_secret: Option<ClientSecret>,
}

#[derive(serde::Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_uri: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

impl TokenClient {
    pub fn new(http: reqwest::Client, client_id: ClientId, client_secret: Option<ClientSecret>) -> Self {
        Self {
            http,
            client_id,
            client_secret,
        }
    }

    #[tracing::instrument(skip_all, fields(client_id = ?self.client_id))]
    pub async fn exchange_code(
        &self,
        config: &OpenIdConfig,
        code: &str,
        redirect_uri: &str,
    ) -> Result<Authentication, TokenError> {
        event!(Level::TRACE, "Exchanging authorization code");
        let request = TokenRequest {
            grant_type: "authorization_code",
            client_id: &self.client_id.0,
            client_secret: self.client_secret.as_ref().map(AsRef::as_ref),
            code: Some(code),
            redirect_uri: Some(redirect_uri),
            refresh_token: None,
        };
        let response = self.request(config, &request).await?;
        Ok(into_authentication(response, None))
    }

    /// Refreshes `auth`. Providers that do not rotate refresh tokens keep the
    /// one we already hold.
    #[tracing::instrument(skip_all, fields(client_id = ?self.client_id))]
    pub async fn refresh(
        &self,
        config: &OpenIdConfig,
        auth: &Authentication,
        refresh_token: &RefreshToken,
    ) -> Result<Authentication, TokenError> {
        event!(Level::TRACE, "Refreshing access token");
        let request = TokenRequest {
            grant_type: "refresh_token",
            client_id: &self.client_id.0,
            client_secret: self.client_secret.as_ref().map(AsRef::as_ref),
            code: None,
            redirect_uri: None,
            refresh_token: Some(&refresh_token.0),
        };
        let response = self.request(config, &request).await?;
        let mut refreshed = into_authentication(response, Some(refresh_token));
        if refreshed.id_token.is_none() {
            refreshed.id_token = auth.id_token.clone();
        }
        Ok(refreshed)
    }

    async fn request(
        &self,
        config: &OpenIdConfig,
        request: &TokenRequest<'_>,
    ) -> Result<AccessTokenResponse, TokenError> {
        let response = self
            .http
            .post(&config.token_endpoint)
            .form(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(match serde_json::from_slice::<ErrorResponse>(&body) {
                Ok(error) => {
                    event!(Level::WARN, error = ?error.kind, "Token endpoint rejected the request");
                    TokenError::Rejected(error)
                }
                Err(_) => TokenError::Status(status.as_u16()),
            });
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

fn into_authentication(response: AccessTokenResponse, previous: Option<&RefreshToken>) -> Authentication {
    Authentication {
        access_token: AccessToken(response.access_token),
        refresh_token: response
            .refresh_token
            .map(RefreshToken)
            .or_else(|| previous.cloned()),
        id_token: response.id_token.map(IdToken),
        expires_in: response.expires_in,
    }
}
