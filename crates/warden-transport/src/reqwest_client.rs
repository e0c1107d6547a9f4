//! [`HttpClient`] implementation using `reqwest`.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::RequestBuilder;

use crate::{join_url, HttpClient, TokenSource, TransportError};

/// A `reqwest`-backed [`HttpClient`].
///
/// Supports both credential styles a server may use:
/// - cookies: the client keeps a cookie store, so a `Set-Cookie` from
///   `/login` is replayed on every later request;
/// - bearer tokens: when a [`TokenSource`] is attached, its current token is
///   sent as `Authorization: Bearer ...`.
///
/// Cloning is cheap; clones share the connection pool and cookie store.
#[derive(Clone)]
pub struct ReqwestClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Option<Arc<dyn TokenSource>>,
}

impl ReqwestClient {
    /// Creates a client that resolves request paths against `base_url`.
    ///
    /// # Errors
    /// Returns [`TransportError::InvalidRequest`] if the underlying client
    /// cannot be constructed (TLS backend initialization).
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        tracing::debug!(base_url, "HTTP client ready");
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            tokens: None,
        })
    }

    /// Attaches a bearer token source, consulted on every request.
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Returns the base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.tokens.as_ref().and_then(|t| t.bearer_token()) {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn send(
        &self,
        builder: RequestBuilder,
    ) -> Result<Vec<u8>, TransportError> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(map_request_error)?
            .to_vec();

        if status.is_success() {
            Ok(body)
        } else {
            tracing::debug!(status = status.as_u16(), "request rejected");
            Err(TransportError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

impl HttpClient for ReqwestClient {
    async fn get(&self, path: &str) -> Result<Vec<u8>, TransportError> {
        let url = join_url(&self.base_url, path);
        self.send(self.http.get(url)).await
    }

    async fn post(
        &self,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, TransportError> {
        let url = join_url(&self.base_url, path);
        let builder = match body {
            Some(body) => self
                .http
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .body(body),
            None => self.http.post(url),
        };
        self.send(builder).await
    }
}

/// Maps `reqwest` failures to transport errors, separating timeouts so the
/// caller can word them differently.
fn map_request_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_builder() {
        TransportError::InvalidRequest(err.to_string())
    } else {
        TransportError::Network(err.to_string())
    }
}
