//! HTTP boundary for Warden.
//!
//! Warden never talks to the network directly. Everything above this crate
//! goes through the [`HttpClient`] trait: two methods, `get` and `post`, that
//! return the response body on a 2xx status and a [`TransportError`]
//! otherwise. Transport details (cookies, headers, TLS, retries) belong to
//! the implementation, not to the session layer.
//!
//! # Feature Flags
//!
//! - `reqwest` (default): [`ReqwestClient`], an implementation backed by
//!   `reqwest` with a cookie store and optional bearer tokens.

mod error;
#[cfg(feature = "reqwest")]
mod reqwest_client;

pub use error::TransportError;
#[cfg(feature = "reqwest")]
pub use reqwest_client::ReqwestClient;

use std::future::Future;
use std::sync::Arc;

/// Sends requests to the application API.
///
/// Paths are relative to whatever base the implementation was configured
/// with (`"/user"`, `"/login"`, ...). Bodies are already-encoded JSON.
///
/// The futures must be `Send` so a gateway holding the client can be driven
/// from any Tokio task.
pub trait HttpClient: Send + Sync + 'static {
    /// Issues a `GET` request and returns the body of a 2xx response.
    ///
    /// # Errors
    /// - [`TransportError::Status`] for a non-2xx response (body included)
    /// - [`TransportError::Network`] / [`TransportError::Timeout`] when no
    ///   response was received
    fn get(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;

    /// Issues a `POST` request with an optional JSON body and returns the
    /// body of a 2xx response.
    ///
    /// # Errors
    /// Same as [`HttpClient::get`].
    fn post(
        &self,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;
}

/// Shared clients are clients too. Lets callers keep a handle to the same
/// client the gateway uses.
impl<T: HttpClient> HttpClient for Arc<T> {
    fn get(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        (**self).get(path)
    }

    fn post(
        &self,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send {
        (**self).post(path, body)
    }
}

/// Supplies the bearer token attached to outgoing requests, if any.
///
/// Cookie-based deployments simply never return a token. The session store
/// implements this so the client always sends the current credential.
pub trait TokenSource: Send + Sync + 'static {
    /// Returns the token to send as `Authorization: Bearer <token>`.
    fn bearer_token(&self) -> Option<String>;
}

/// Joins a base URL and a request path without doubling slashes.
///
/// An empty base yields the path unchanged, which is what a same-origin
/// deployment wants.
pub fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}
