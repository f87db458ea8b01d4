//! Wire DTOs for the REST backend.
//!
//! DESIGN
//! ======
//! Optional response fields default instead of failing so older backend
//! builds (which omit `user` or `hint`) still deserialize.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// A user as identified by the backend and embedded in tokens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// Body of `POST /api/auth/login` and `POST /api/auth/register`.
#[derive(Debug, Serialize)]
pub struct CredentialsRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful credential exchange response.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Encryption method advertised by `GET /api/crypto/methods`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionMethod {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub requires_key: bool,
    #[serde(default)]
    pub hint: String,
}

/// Extract the `error` string from a JSON error body, if any.
pub fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|msg| !msg.trim().is_empty())
}

/// Stored message as returned by `GET /api/messages`. Only the ciphertext
/// ever leaves the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub encrypted_content: String,
    pub method: String,
    #[serde(default)]
    pub created_at: String,
    pub sender_id: i64,
    pub receiver_id: i64,
}

/// Body of `POST /api/messages`. The backend encrypts `text` with `method`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    pub receiver_id: i64,
    pub text: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Body of `POST /api/messages/decrypt`.
#[derive(Debug, Serialize)]
pub struct DecryptRequest<'a> {
    pub encrypted: &'a str,
    pub method: &'a str,
    pub key: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct DecryptResponse {
    pub decrypted: String,
}
