//! Minimal HTTP seam between the gateway and the browser fetch stack.
//!
//! SYSTEM CONTEXT
//! ==============
//! In the browser (`csr`) requests go through `gloo-net`. Native builds use
//! [`OfflineHttpClient`], which fails every request the way the browser does
//! when the backend is unreachable. Tests script responses through the same
//! trait.

use serde::de::DeserializeOwned;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: Method::Get, url: url.into(), bearer: None, body: None }
    }

    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self { method: Method::Post, url: url.into(), bearer: None, body: Some(body) }
    }

    #[must_use]
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the serde error when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Failure to obtain any HTTP response.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("failed to build request: {0}")]
    Request(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("backend not available in this build")]
    Unavailable,
}

/// Sends one request and returns whatever status the backend answered with.
///
/// Only a missing response is an error; non-2xx statuses are returned as
/// ordinary responses for the caller to interpret.
#[allow(async_fn_in_trait)]
pub trait HttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Client used outside the browser.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineHttpClient;

impl HttpClient for OfflineHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let _ = request;
        Err(TransportError::Unavailable)
    }
}

/// `fetch`-backed client for the browser.
#[cfg(feature = "csr")]
#[derive(Clone, Copy, Debug, Default)]
pub struct GlooHttpClient;

#[cfg(feature = "csr")]
impl HttpClient for GlooHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        use gloo_net::http::Request;

        let mut builder = match request.method {
            Method::Get => Request::get(&request.url),
            Method::Post => Request::post(&request.url),
        };
        if let Some(token) = &request.bearer {
            builder = builder.header("Authorization", &format!("Bearer {token}"));
        }
        let sent = match &request.body {
            Some(body) => builder.json(body).map_err(|e| TransportError::Request(e.to_string()))?.send().await,
            None => builder.send().await,
        };
        let resp = sent.map_err(|e| TransportError::Network(e.to_string()))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

/// The client the app is built with for the current target.
#[cfg(feature = "csr")]
pub type BrowserHttpClient = GlooHttpClient;
#[cfg(not(feature = "csr"))]
pub type BrowserHttpClient = OfflineHttpClient;
