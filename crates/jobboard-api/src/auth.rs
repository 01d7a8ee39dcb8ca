//! Shared-secret authorization for mutating routes.
//!
//! The `Authorization` header must carry the configured API key verbatim.
//! Both sides are reduced to HMAC-SHA256 tags and compared with
//! `Mac::verify_slice`, so the check takes the same time whatever the
//! header contains.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Fixed key for deriving comparison tags.
const TAG_KEY: &[u8] = b"jobboard-api-key-v1";

fn tag(value: &[u8]) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(TAG_KEY).ok()?;
    mac.update(value);
    Some(mac)
}

/// Checks presented credentials against the configured API key.
#[derive(Clone)]
pub struct ApiKeyVerifier {
    expected: Option<Vec<u8>>,
}

impl ApiKeyVerifier {
    /// A verifier for `api_key`. With no key every credential is refused.
    pub fn new(api_key: Option<&str>) -> Self {
        let expected = api_key
            .filter(|k| !k.is_empty())
            .and_then(|k| tag(k.as_bytes()))
            .map(|mac| mac.finalize().into_bytes().to_vec());
        Self { expected }
    }

    pub fn is_configured(&self) -> bool {
        self.expected.is_some()
    }

    /// True when `presented` equals the configured key.
    pub fn verify(&self, presented: &str) -> bool {
        let Some(expected) = &self.expected else {
            return false;
        };
        match tag(presented.as_bytes()) {
            Some(mac) => mac.verify_slice(expected).is_ok(),
            None => false,
        }
    }
}

/// Proof that the request carried the API key.
///
/// Taking this extractor before a body extractor makes authorization run
/// before the body is parsed or validated.
#[derive(Debug, Clone, Copy)]
pub struct ApiKey;

#[axum::async_trait]
impl FromRequestParts<AppState> for ApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?
            .to_str()
            .map_err(|_| ApiError::unauthorized("Invalid Authorization header"))?;

        if !state.api_key.verify(header) {
            warn!(path = %parts.uri.path(), "Rejected request with invalid API key");
            return Err(ApiError::unauthorized("Invalid API key"));
        }

        Ok(ApiKey)
    }
}
