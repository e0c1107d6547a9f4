//! Serialization boundary between the live session and durable storage.
//!
//! Only `user` and `token` are persisted. The record is a small versioned
//! JSON document:
//!
//! ```json
//! { "version": 1, "user": { "id": 1, "email": "a@b.com", ... }, "token": "t1" }
//! ```
//!
//! These are plain functions so they can be exercised without a store.

use serde::{Deserialize, Serialize};
use warden_protocol::{Codec, Identity, JsonCodec};

use crate::{Session, SessionError};

/// Version written into every record. Records with any other version are
/// treated as corrupt.
pub const RECORD_VERSION: u32 = 1;

/// The durable subset of a [`Session`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedSession {
    pub user: Option<Identity>,
    pub token: Option<String>,
}

impl PersistedSession {
    /// Returns `true` if neither field is present.
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.token.is_none()
    }
}

#[derive(Serialize)]
struct RecordOut<'a> {
    version: u32,
    user: &'a Option<Identity>,
    token: &'a Option<String>,
}

#[derive(Deserialize)]
struct RecordIn {
    version: u32,
    #[serde(default)]
    user: Option<Identity>,
    #[serde(default)]
    token: Option<String>,
}

/// Encodes the persisted subset of `session`.
///
/// # Errors
/// Returns [`SessionError::Encode`] if the identity cannot be serialized
/// (only possible with exotic profile values).
pub fn serialize(session: &Session) -> Result<Vec<u8>, SessionError> {
    let record = RecordOut {
        version: RECORD_VERSION,
        user: &session.user,
        token: &session.token,
    };
    JsonCodec.encode(&record).map_err(SessionError::Encode)
}

/// Decodes a stored record.
///
/// # Errors
/// Returns [`SessionError::Corrupt`] for malformed JSON, an unsupported
/// version, or a token without a user (a pair that was never written
/// together).
pub fn deserialize(bytes: &[u8]) -> Result<PersistedSession, SessionError> {
    let record: RecordIn = JsonCodec
        .decode(bytes)
        .map_err(|e| SessionError::Corrupt(e.to_string()))?;

    if record.version != RECORD_VERSION {
        return Err(SessionError::Corrupt(format!(
            "unsupported record version {}",
            record.version
        )));
    }
    if record.user.is_none() && record.token.is_some() {
        return Err(SessionError::Corrupt("token without user".into()));
    }

    Ok(PersistedSession {
        user: record.user,
        token: record.token,
    })
}
