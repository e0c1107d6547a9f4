//! Session types: the data the client knows about its own sign-in state.
//!
//! A "session" here is the client's view of authentication. It tracks:
//! - WHO is signed in (`user`) and with WHAT credential (`token`)
//! - WHETHER a request is running (`loading`) and how the last one failed (`error`)
//! - WHETHER the persisted pair has been restored yet (`hydrated`)

use std::fmt;

use warden_protocol::Identity;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for the session store.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Durable storage key holding the serialized `{ user, token }` record.
    ///
    /// Default: `"warden.session"`.
    pub storage_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: "warden.session".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The full client-observable authentication state.
///
/// ```text
///   created empty ──(hydrate, once)──→ restored ──(check_auth/login/logout/reset)──→ ...
///   hydrated: false ─────────────────→ true (never goes back)
/// ```
///
/// Values of this type handed out by the store are snapshots. Changing a
/// snapshot's fields changes nothing; the store only moves through its named
/// operations.
#[derive(Clone, Default, PartialEq)]
pub struct Session {
    /// The signed-in identity, if any.
    pub user: Option<Identity>,

    /// Bearer credential. Absent for cookie-based servers even when signed in.
    pub token: Option<String>,

    /// A verification or login/logout request is in flight.
    pub loading: bool,

    /// Human-readable message of the last failed login.
    pub error: Option<String>,

    /// The one-time restore from durable storage has completed.
    pub hydrated: bool,
}

impl Session {
    /// Returns `true` if an identity is present.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Derives the consumer-facing view of this snapshot.
    pub fn view(&self) -> AuthView {
        AuthView {
            user: self.user.clone(),
            is_authenticated: self.is_authenticated(),
            loading: self.loading || !self.hydrated,
            error: self.error.clone(),
            hydrated: self.hydrated,
        }
    }
}

/// Tokens stay out of logs: `Debug` only says whether one is present.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user.as_ref().map(|u| &u.id))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("loading", &self.loading)
            .field("error", &self.error)
            .field("hydrated", &self.hydrated)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// AuthView
// ---------------------------------------------------------------------------

/// What consumers (guards, pages) are allowed to look at.
///
/// `loading` here is NOT the raw flag: it stays `true` until hydration has
/// finished as well, so nothing treats the session as settled while the
/// persisted identity may still be on its way.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthView {
    pub user: Option<Identity>,
    pub is_authenticated: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub hydrated: bool,
}
