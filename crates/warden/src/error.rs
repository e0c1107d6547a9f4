//! Unified error type for Warden.

use warden_auth::{AuthError, CredentialError};
use warden_protocol::ProtocolError;
use warden_session::SessionError;
use warden_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WardenError {
    /// A configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Building or using the HTTP client failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Bytes did not have the expected shape.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Durable storage could not be read or written.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A request to the API failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A login was rejected or could not complete.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// A global tracing subscriber is already installed.
    #[error("telemetry setup failed: {0}")]
    Telemetry(String),
}
