//! Wire protocol for Warden.
//!
//! This crate defines what the client and the application API exchange, and
//! what the client keeps about the signed-in user:
//!
//! - **Types** ([`Identity`], [`Roles`], [`Role`], [`LoginRequest`], ...):
//!   the identity model and the request/response bodies of the three
//!   endpoints (`GET /user`, `POST /login`, `POST /logout`).
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those values are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (Identity, bodies) → Session (store) → Auth → Guard
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ErrorBody, Identity, LoginRequest, LoginResponse, Role, Roles, UserId,
    UserResponse,
};
