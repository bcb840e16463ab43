use tracing::{event, Level};

use super::{Authentication, CurrentUser};

/// Subset of the access token payload the console cares about.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct AccessClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default)]
    pub scp: Vec<String>,
}

/// Reads the JWT payload without checking its signature. The token came out of
/// our own encrypted cookie; verifying it is the backend's job.
pub fn jwt_payload(token: &str) -> Option<AccessClaims> {
    match jsonwebtoken::dangerous_insecure_decode::<AccessClaims>(token) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            event!(Level::DEBUG, error = %e, "Access token payload is not decodable");
            None
        }
    }
}

pub fn current_user(auth: &Authentication) -> CurrentUser {
    let scp = jwt_payload(&auth.access_token.0)
        .map(|claims| claims.scp)
        .unwrap_or_default();
    CurrentUser { scp }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AccessToken;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(payload: serde_json::Value) -> String {
        encode(&Header::default(), &payload, &EncodingKey::from_secret(b"unrelated")).unwrap()
    }

    fn auth(access_token: String) -> Authentication {
        Authentication {
            access_token: AccessToken(access_token),
            refresh_token: None,
            id_token: None,
            expires_in: None,
        }
    }

    #[test]
    fn scopes_come_from_the_scp_claim() {
        let jwt = token(serde_json::json!({
            "sub": "user",
            "scp": ["ledger:read", "webhooks:write"],
            "exp": 1
        }));
        assert_eq!(
            current_user(&auth(jwt)).scp,
            vec!["ledger:read".to_string(), "webhooks:write".to_string()]
        );
    }

    #[test]
    fn missing_scp_means_no_scopes() {
        let jwt = token(serde_json::json!({"sub": "user"}));
        assert!(current_user(&auth(jwt)).scp.is_empty());
    }

    #[test]
    fn opaque_tokens_mean_no_scopes() {
        assert!(current_user(&auth("opaque".to_string())).scp.is_empty());
    }
}
