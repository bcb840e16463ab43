use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{event, Level};

use super::{OpenIdConfig, DISCOVERY_PATH};

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("discovery request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("discovery endpoint answered {0}")]
    Status(u16),
    #[error("discovery document is malformed: {0}")]
    Document(#[from] serde_json::Error),
}

/// Fetches the identity provider's discovery document and keeps it for `ttl`.
/// Concurrent refetches after expiry are harmless; the document is static in
/// practice.
#[derive(Debug)]
pub struct DiscoveryClient {
    http: reqwest::Client,
    url: String,
    ttl: Duration,
    cached: RwLock<Option<(Instant, OpenIdConfig)>>,
}

impl DiscoveryClient {
    pub fn new(http: reqwest::Client, issuer: &str, ttl: Duration) -> Self {
        Self {
            http,
            url: format!("{}{}", issuer.trim_end_matches('/'), DISCOVERY_PATH),
            ttl,
            cached: RwLock::new(None),
        }
    }

    #[tracing::instrument(skip_all, fields(url = %self.url))]
    pub async fn fetch(&self) -> Result<OpenIdConfig, DiscoveryError> {
        if let Some((fetched_at, config)) = &*self.cached.read().await {
            if fetched_at.elapsed() < self.ttl {
                return Ok(config.clone());
            }
        }

        event!(Level::DEBUG, "Fetching OpenID discovery document");
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            event!(Level::ERROR, status = status.as_u16(), "Discovery endpoint failed");
            return Err(DiscoveryError::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        let config: OpenIdConfig = serde_json::from_slice(&body)?;

        *self.cached.write().await = Some((Instant::now(), config.clone()));
        Ok(config)
    }
}
