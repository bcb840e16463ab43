use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::error::StateError;

/// Round-tripped through the identity provider as the `state` parameter so the
/// callback can send the user back where they started.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub redirect_to: String,
}

impl State {
    pub fn new(path: &str, query: &str) -> Self {
        let redirect_to = if query.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, query)
        };
        Self { redirect_to }
    }

    pub fn encode(&self) -> Result<String, StateError> {
        let json = serde_json::to_vec(self)?;
        Ok(STANDARD.encode(json))
    }

    pub fn decode(encoded: &str) -> Result<Self, StateError> {
        let json = STANDARD.decode(encoded.trim())?;
        Ok(serde_json::from_slice(&json)?)
    }

    /// Target to redirect to after login. Anything but a local absolute path
    /// falls back to the root.
    pub fn local_target(&self) -> &str {
        let target = self.redirect_to.as_str();
        if target.starts_with('/') && !target.starts_with("//") && !target.starts_with("/\\") {
            target
        } else {
            "/"
        }
    }
}
