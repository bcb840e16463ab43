use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use cookie::{Cookie, SameSite};
use sha2::{Digest, Sha256};

use super::error::SessionError;
use super::Authentication;
use crate::util::random::random_bytes;

pub const COOKIE_NAME: &str = "__session";

const NONCE_LEN: usize = 12;

/// Seals the `Authentication` record into an opaque cookie value.
pub struct SessionCodec {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionCodec {{ ... }}")
    }
}

impl SessionCodec {
    pub fn new(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let key = Key::<Aes256Gcm>::from_slice(digest.as_slice());
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    pub fn encrypt(&self, auth: &Authentication) -> Result<String, SessionError> {
        let plaintext = serde_json::to_vec(auth)?;
        let nonce_bytes = random_bytes::<NONCE_LEN>();
        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_slice())
            .map_err(|_| SessionError::Cipher)?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&sealed);
        Ok(URL_SAFE_NO_PAD.encode(out))
    }

    pub fn decrypt(&self, value: &str) -> Result<Authentication, SessionError> {
        let raw = URL_SAFE_NO_PAD.decode(value.trim())?;
        if raw.len() <= NONCE_LEN {
            return Err(SessionError::Truncated);
        }
        let (nonce, sealed) = raw.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| SessionError::Cipher)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }
}

pub fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}
