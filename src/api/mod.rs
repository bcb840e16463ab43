//! Typed client for the platform's backend services.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{event, Level};

use crate::auth::Authentication;
use crate::core::types::AccessToken;

pub mod error;

pub use error::ApiError;

/// Base URLs of the backend services, all behind the same gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    pub ledger: String,
    pub payment: String,
    pub auth: String,
    pub webhook: String,
}

impl Endpoints {
    pub fn new(api_url: &str) -> Self {
        let base = api_url.trim_end_matches('/');
        Self {
            ledger: format!("{}/api/ledger", base),
            payment: format!("{}/api/payments", base),
            auth: format!("{}/api/auth", base),
            webhook: format!("{}/api/webhooks", base),
        }
    }
}

/// Envelope key a resource is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unwrap {
    Data,
    Cursor,
}

impl Unwrap {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Cursor => "cursor",
        }
    }
}

/// Pulls the payload out of a response body. A bare array is accepted as is;
/// a missing or null payload is `None`.
pub fn unwrap_body<T: DeserializeOwned>(
    body: serde_json::Value,
    unwrap: Unwrap,
) -> Result<Option<T>, ApiError> {
    let payload = match body {
        serde_json::Value::Object(mut map) => map.remove(unwrap.key()),
        serde_json::Value::Array(_) => Some(body),
        _ => None,
    };

    match payload {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
    }
}

/// Query parameters forwarded to list endpoints.
pub const QUERY_PARAMS: [&str; 5] = ["cursor", "pageSize", "after", "startTime", "endTime"];

/// Keeps the forwarded parameters of a raw page query, dropping empty values.
pub fn sanitize_query(raw: &str) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        if !value.is_empty() && QUERY_PARAMS.contains(&key.as_ref()) {
            out.append_pair(&key, &value);
        }
    }
    out.finish()
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    token: AccessToken,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, auth: &Authentication) -> Self {
        Self {
            http,
            token: auth.access_token.clone(),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_resource<T: DeserializeOwned>(
        &self,
        url: &str,
        unwrap: Unwrap,
    ) -> Result<Option<T>, ApiError> {
        self.send(self.http.get(url), unwrap).await
    }

    #[tracing::instrument(skip(self, body))]
    pub async fn post_resource<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        unwrap: Unwrap,
    ) -> Result<Option<T>, ApiError> {
        self.send(self.http.post(url).json(body), unwrap).await
    }

    #[tracing::instrument(skip(self, body))]
    pub async fn put_resource<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        unwrap: Unwrap,
    ) -> Result<Option<T>, ApiError> {
        self.send(self.http.put(url).json(body), unwrap).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        unwrap: Unwrap,
    ) -> Result<Option<T>, ApiError> {
        let response = request.bearer_auth(&self.token.0).send().await?;
        let status = response.status();
        if !status.is_success() {
            event!(Level::WARN, status = status.as_u16(), "Backend request failed");
            return Err(ApiError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        let body: serde_json::Value = serde_json::from_slice(&bytes)?;
        unwrap_body(body, unwrap)
    }
}
