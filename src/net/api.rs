//! Auth gateway: credential exchange, token validation, and the lookups and
//! message traffic the chat page needs.
//!
//! ERROR HANDLING
//! ==============
//! Credential and lookup failures surface as [`AuthError`], whose `Display`
//! is the inline message shown to the user. Validation never errors: it
//! resolves to a [`TokenVerdict`] and removes the token itself when the
//! backend (or, by policy, the network) says it is unusable.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde::de::DeserializeOwned;

use super::http::{HttpClient, HttpRequest, HttpResponse, TransportError};
use super::types::{
    CredentialsRequest, DecryptRequest, DecryptResponse, EncryptionMethod, Message, OutgoingMessage, TokenResponse,
    User, error_message,
};
use crate::config::ClientConfig;
use crate::util::token_store::TokenStore;

pub const MESSAGES_PATH: &str = "/messages";
pub const DECRYPT_PATH: &str = "/messages/decrypt";
/// Protected resource the validation request reads to test the held token.
pub const VALIDATION_PATH: &str = MESSAGES_PATH;
pub const METHODS_PATH: &str = "/crypto/methods";
pub const USERS_PATH: &str = "/users";

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Backend rejected the credentials; message is shown verbatim.
    #[error("{0}")]
    Credential(String),
    /// Backend answered a lookup with a non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("{0}")]
    MissingToken(&'static str),
    #[error("Authentication required")]
    NotAuthenticated,
    #[error("Unexpected response from server: {0}")]
    Decode(String),
    #[error("Could not reach the server ({0})")]
    Transport(#[from] TransportError),
}

/// One credential-exchange endpoint and its user-facing fallbacks.
struct CredentialEndpoint {
    path: &'static str,
    failure: &'static str,
    missing_token: &'static str,
}

const LOGIN: CredentialEndpoint = CredentialEndpoint {
    path: "/auth/login",
    failure: "Login failed",
    missing_token: "Login failed: No token received",
};

const REGISTER: CredentialEndpoint = CredentialEndpoint {
    path: "/auth/register",
    failure: "Registration failed",
    missing_token: "Registration failed: No token received",
};

/// Result of the validation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenVerdict {
    /// No token stored; no request was made.
    NoToken,
    /// 2xx: the token is accepted.
    Valid,
    /// 401: the token was rejected and has been removed.
    Invalid,
    /// Any other non-2xx status. The token is kept.
    Rejected(u16),
    /// No response at all.
    Unreachable,
}

impl TokenVerdict {
    pub fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }
}

pub struct AuthGateway<C> {
    client: C,
    store: TokenStore,
    api_base_url: String,
    clear_token_on_transport_failure: bool,
}

impl<C: HttpClient> AuthGateway<C> {
    pub fn new(client: C, store: TokenStore, config: &ClientConfig) -> Self {
        Self {
            client,
            store,
            api_base_url: config.api_base_url.clone(),
            clear_token_on_transport_failure: config.clear_token_on_transport_failure,
        }
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base_url)
    }

    /// Exchange credentials for a token via `POST /auth/login`.
    ///
    /// The token is returned, not stored.
    ///
    /// # Errors
    ///
    /// [`AuthError::Credential`] on a non-2xx status (the body's `error` or
    /// "Login failed"), [`AuthError::MissingToken`] when a 2xx body carries no
    /// token, [`AuthError::Transport`] when no response arrives.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        self.exchange_credentials(&LOGIN, username, password).await
    }

    /// Create an account and receive a token via `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Same contract as [`AuthGateway::login`] with "Registration failed".
    pub async fn register(&self, username: &str, password: &str) -> Result<String, AuthError> {
        self.exchange_credentials(&REGISTER, username, password).await
    }

    async fn exchange_credentials(
        &self,
        endpoint: &CredentialEndpoint,
        username: &str,
        password: &str,
    ) -> Result<String, AuthError> {
        let body = serde_json::to_value(CredentialsRequest { username, password })
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let resp = self.client.send(HttpRequest::post(self.endpoint(endpoint.path), body)).await?;

        if !resp.is_success() {
            log::info!("{} rejected with status {}", endpoint.path, resp.status);
            let message = error_message(&resp.body).unwrap_or_else(|| endpoint.failure.to_owned());
            return Err(AuthError::Credential(message));
        }

        let body: TokenResponse = resp.json().map_err(|e| AuthError::Decode(e.to_string()))?;
        body.access_token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken(endpoint.missing_token))
    }

    /// Check the stored token with the backend.
    ///
    /// The store is read synchronously before any request, so a removal that
    /// lands first means no request is made at all.
    pub async fn verify_token(&self) -> TokenVerdict {
        let Some(token) = self.store.get() else {
            return TokenVerdict::NoToken;
        };

        let request = HttpRequest::get(self.endpoint(VALIDATION_PATH)).with_bearer(token.as_str());
        match self.client.send(request).await {
            Ok(resp) if resp.is_success() => TokenVerdict::Valid,
            Ok(resp) if resp.status == 401 => {
                log::info!("stored token rejected by backend; clearing it");
                self.store.remove_if_current(&token);
                TokenVerdict::Invalid
            }
            Ok(resp) => {
                log::warn!("validation request returned status {}; keeping token", resp.status);
                TokenVerdict::Rejected(resp.status)
            }
            Err(err) => {
                log::warn!("validation request failed: {err}");
                if self.clear_token_on_transport_failure {
                    self.store.remove_if_current(&token);
                }
                TokenVerdict::Unreachable
            }
        }
    }

    /// `true` only when the backend accepted the stored token.
    pub async fn validate(&self) -> bool {
        self.verify_token().await.is_valid()
    }

    /// Fetch the encryption methods the backend supports.
    ///
    /// # Errors
    ///
    /// [`AuthError::Http`] on a non-2xx status, [`AuthError::Decode`] on an
    /// unexpected body, [`AuthError::Transport`] when no response arrives.
    pub async fn fetch_encryption_methods(&self) -> Result<Vec<EncryptionMethod>, AuthError> {
        let resp = self.client.send(HttpRequest::get(self.endpoint(METHODS_PATH))).await?;
        json_or_error(&resp)
    }

    /// Fetch every user except the signed-in one.
    ///
    /// # Errors
    ///
    /// [`AuthError::NotAuthenticated`] without a stored token (no request is
    /// made), otherwise as [`AuthGateway::fetch_encryption_methods`].
    pub async fn fetch_users(&self) -> Result<Vec<User>, AuthError> {
        let token = self.store.get().ok_or(AuthError::NotAuthenticated)?;
        let resp = self
            .client
            .send(HttpRequest::get(self.endpoint(USERS_PATH)).with_bearer(token))
            .await?;
        json_or_error(&resp)
    }

    /// Fetch the signed-in user's messages, ciphertext only.
    ///
    /// # Errors
    ///
    /// As [`AuthGateway::fetch_users`].
    pub async fn fetch_messages(&self) -> Result<Vec<Message>, AuthError> {
        let token = self.store.get().ok_or(AuthError::NotAuthenticated)?;
        let resp = self
            .client
            .send(HttpRequest::get(self.endpoint(MESSAGES_PATH)).with_bearer(token))
            .await?;
        json_or_error(&resp)
    }

    /// Hand a plaintext message to the backend, which encrypts and stores it.
    ///
    /// # Errors
    ///
    /// As [`AuthGateway::fetch_users`]; a 400 carries the backend's reason
    /// (unknown method, missing key).
    pub async fn send_message(&self, message: &OutgoingMessage) -> Result<Message, AuthError> {
        let token = self.store.get().ok_or(AuthError::NotAuthenticated)?;
        let body = serde_json::to_value(message).map_err(|e| TransportError::Request(e.to_string()))?;
        let resp = self
            .client
            .send(HttpRequest::post(self.endpoint(MESSAGES_PATH), body).with_bearer(token))
            .await?;
        json_or_error(&resp)
    }

    /// Ask the backend to decrypt one ciphertext. Nothing is stored.
    ///
    /// # Errors
    ///
    /// [`AuthError::Http`] with the backend's reason when the key is wrong or
    /// the method unknown, otherwise as [`AuthGateway::fetch_encryption_methods`].
    pub async fn decrypt_message(&self, encrypted: &str, method: &str, key: &str) -> Result<String, AuthError> {
        let body = serde_json::to_value(DecryptRequest { encrypted, method, key })
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let resp = self.client.send(HttpRequest::post(self.endpoint(DECRYPT_PATH), body)).await?;
        let body: DecryptResponse = json_or_error(&resp)?;
        Ok(body.decrypted)
    }
}

fn json_or_error<T: DeserializeOwned>(resp: &HttpResponse) -> Result<T, AuthError> {
    if !resp.is_success() {
        return Err(http_error(resp.status, &resp.body));
    }
    resp.json().map_err(|e| AuthError::Decode(e.to_string()))
}

fn http_error(status: u16, body: &str) -> AuthError {
    let message = error_message(body).unwrap_or_else(|| format!("HTTP error! status: {status}"));
    AuthError::Http { status, message }
}
