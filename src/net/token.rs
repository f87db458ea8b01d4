//! Display-identity extraction from bearer tokens.
//!
//! The signature is never checked here: a decoded payload is only good enough
//! to show who is signed in. Whether the token is usable is decided by the
//! backend validation request.

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use serde::Deserialize;

use super::types::User;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("token must have three dot-separated segments, found {0}")]
    Segments(usize),
    #[error("token payload is not valid base64")]
    Base64,
    #[error("token payload is not a valid claims object: {0}")]
    Claims(String),
}

#[derive(Deserialize)]
struct Claims {
    user_id: i64,
    username: String,
}

/// Decode the payload segment of `token` into the user it names.
///
/// # Errors
///
/// Returns [`DecodeError`] when the token is not `header.payload.signature`,
/// the payload is not base64 (URL-safe or standard, padding optional), or the
/// JSON lacks `user_id`/`username`.
pub fn decode_identity(token: &str) -> Result<User, DecodeError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(DecodeError::Segments(segments.len()));
    }

    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .map_err(|_| DecodeError::Base64)?;

    let claims: Claims = serde_json::from_slice(&bytes).map_err(|e| DecodeError::Claims(e.to_string()))?;
    Ok(User { id: claims.user_id, username: claims.username })
}
