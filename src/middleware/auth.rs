use axum::http::{header, HeaderMap};
use sha2::{Digest, Sha256};

use crate::config;
use crate::error::ApiError;

/// Credential gate for the record families that require the shared API key.
///
/// The whole `Authorization` value is matched against `Bearer <key>`, scheme
/// case included, and a missing header, unreadable bytes, and a wrong key
/// are indistinguishable to the caller.
pub fn require_api_key(headers: &HeaderMap) -> Result<(), ApiError> {
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if credential_matches(presented, &config::config().security.api_key) {
        Ok(())
    } else {
        Err(ApiError::unauthorized("Invalid API Key"))
    }
}

/// Compare the presented header value against `Bearer <key>` by hashing both
/// sides, so the comparison cost does not depend on where the values differ.
fn credential_matches(presented: &str, api_key: &str) -> bool {
    let expected = format!("Bearer {}", api_key);
    Sha256::digest(presented.as_bytes()) == Sha256::digest(expected.as_bytes())
}
