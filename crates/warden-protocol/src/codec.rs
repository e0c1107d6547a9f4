//! Codec trait and implementations for serializing/deserializing bodies.
//!
//! Request bodies, response bodies and the persisted session record all go
//! through a [`Codec`]. The layers above don't care about the format; they
//! only need something that implements the trait.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust values to bytes and decode bytes back.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the decoded value owns
/// all its data, so the response buffer can be dropped right after decoding.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`), the format every endpoint
/// of the application API speaks.
///
/// ## Example
///
/// ```rust
/// use warden_protocol::{Codec, JsonCodec, LoginRequest};
///
/// let codec = JsonCodec;
/// let bytes = codec
///     .encode(&LoginRequest::new("a@b.com", "secret"))
///     .unwrap();
/// let json: serde_json::Value = codec.decode(&bytes).unwrap();
/// assert_eq!(json["email"], "a@b.com");
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
