//! Error types for the auth layer.

use std::time::Duration;

use warden_protocol::{Codec, ErrorBody, JsonCodec, ProtocolError};
use warden_transport::TransportError;

/// Maximum number of characters of a server message shown to the user.
const MAX_MESSAGE_CHARS: usize = 200;

/// Shown when a login fails and the server gave no usable message.
pub(crate) const GENERIC_LOGIN_FAILURE: &str =
    "Login failed. Please check your credentials and try again.";
/// Shown when the server could not be reached at all.
pub(crate) const UNREACHABLE: &str = "Unable to reach the server. Please try again.";
/// Shown when the login request ran out of time.
pub(crate) const TIMED_OUT: &str = "Request timed out. Please try again.";
/// Shown when a login is attempted before the stored session is restored.
pub(crate) const NOT_READY: &str = "Session is still loading. Please try again.";

/// Why a request to the application API failed.
///
/// Used internally by all three operations and logged; only login turns it
/// into something the caller sees (see [`CredentialError`]).
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No usable response: network failure or non-2xx status.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A 2xx response whose body had the wrong shape, or a request body that
    /// could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The request exceeded the gateway's timeout.
    #[error("request timed out after {0:?}")]
    TimedOut(Duration),

    /// Refused locally: the stored session has not been restored yet.
    #[error("session not restored yet")]
    NotHydrated,
}

impl AuthError {
    /// The message a login form should display for this failure.
    ///
    /// A `{ "message": ... }` body on a rejected request is shown (trimmed
    /// and truncated); anything else gets a fixed wording that reveals
    /// nothing about the server.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(TransportError::Status { body, .. }) => {
                server_message(body).unwrap_or_else(|| GENERIC_LOGIN_FAILURE.to_string())
            }
            Self::Transport(TransportError::Timeout) | Self::TimedOut(_) => {
                TIMED_OUT.to_string()
            }
            Self::Transport(TransportError::Network(_)) => UNREACHABLE.to_string(),
            Self::Transport(TransportError::InvalidRequest(_)) | Self::Protocol(_) => {
                GENERIC_LOGIN_FAILURE.to_string()
            }
            Self::NotHydrated => NOT_READY.to_string(),
        }
    }
}

/// Pulls a non-empty `message` out of an error body.
fn server_message(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = JsonCodec.decode(body).ok()?;
    let message = parsed.message?;
    let trimmed = message.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(MAX_MESSAGE_CHARS).collect())
    }
}

/// A failed login, as reported to the caller.
///
/// `Display` is exactly the message stored in the session's `error` field,
/// so a login form can show either one.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CredentialError {
    message: String,
    #[source]
    cause: AuthError,
}

impl CredentialError {
    pub(crate) fn new(cause: AuthError) -> Self {
        Self {
            message: cause.user_message(),
            cause,
        }
    }

    /// The user-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The underlying failure, for logging.
    pub fn cause(&self) -> &AuthError {
        &self.cause
    }

    /// HTTP status of the rejection, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match &self.cause {
            AuthError::Transport(t) => t.status(),
            _ => None,
        }
    }
}
