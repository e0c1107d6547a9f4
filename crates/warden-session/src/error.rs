//! Error types for the session layer.

use warden_protocol::ProtocolError;

/// Errors that can occur while persisting or restoring a session.
///
/// None of these ever reach a user: the store logs them and carries on with
/// an empty (or unchanged) session. They exist so the persistence functions
/// can be tested and reasoned about on their own.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Reading or writing durable storage failed.
    #[error("storage I/O failed for key `{key}`: {source}")]
    Storage {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The session could not be encoded for storage.
    #[error("failed to encode session: {0}")]
    Encode(#[source] ProtocolError),

    /// The stored record is unreadable: bad JSON, an unknown version, or a
    /// token with no user attached.
    #[error("stored session is corrupt: {0}")]
    Corrupt(String),
}
