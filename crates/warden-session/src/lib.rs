//! Client session state for Warden.
//!
//! This crate owns the one piece of shared mutable state in the client:
//!
//! 1. **State**: who is signed in, with which token, and whether a request
//!    is in flight ([`Session`], derived [`AuthView`])
//! 2. **Store**: the process-wide container that only changes through
//!    named operations and notifies subscribers ([`SessionStore`])
//! 3. **Persistence**: the `{ user, token }` pair written to durable
//!    storage on every change and restored once at start
//!    ([`Storage`], [`persistence`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Guard Layer (above)   ← decides render/redirect from session snapshots
//!     ↕
//! Auth Layer (above)    ← mutates the session through check_auth/login/logout
//!     ↕
//! Session Layer (this crate)  ← holds state, persists it, hydrates it once
//!     ↕
//! Protocol Layer (below)  ← provides Identity and the JSON codec
//! ```

mod error;
pub mod persistence;
mod session;
mod storage;
mod store;

pub use error::SessionError;
pub use persistence::PersistedSession;
pub use session::{AuthView, Session, SessionConfig};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{RequestGate, SessionStore, VerifyGate};
