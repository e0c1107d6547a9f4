//! Error types for the protocol layer.
//!
//! Each crate in Warden defines its own error enum. A `ProtocolError` means
//! bytes did not match the expected shape; it says nothing about the network
//! or the session state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust value).
    ///
    /// Common causes: an HTML error page where JSON was expected, a missing
    /// `user` field, or a truncated body.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The value parsed but is not acceptable, e.g. an unknown role name.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}
