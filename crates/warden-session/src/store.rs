//! The session store: the single shared, observable session.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Holding the current [`Session`] and handing out snapshots
//! - Applying the named mutations (and nothing else)
//! - Writing `{ user, token }` to storage whenever that pair changes
//! - Restoring the pair exactly once at start ([`SessionStore::hydrate`])
//! - Notifying subscribers after every effective change
//!
//! # Concurrency note
//!
//! The state lives in a `tokio::sync::watch` channel. Every mutation is one
//! `send_if_modified` call, which holds the channel's write lock for the
//! duration of the closure. That makes check-and-set operations such as
//! [`SessionStore::begin_verification`] atomic, and because the storage
//! write happens inside the same closure, the durable record always matches
//! the latest in-memory pair.

use std::sync::Arc;

use tokio::sync::watch;
use warden_protocol::Identity;
use warden_transport::TokenSource;

use crate::persistence::{self, PersistedSession};
use crate::{Session, SessionConfig, Storage};

/// Result of the `check_auth` guards, evaluated atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyGate {
    /// Guards passed; `loading` is now set and the caller must dispatch the
    /// request and finish with [`SessionStore::set_user`] or
    /// [`SessionStore::reset`].
    Proceed,
    /// Storage has not been restored yet; there is nothing to verify.
    NotHydrated,
    /// A user is present and the check was not forced.
    AlreadyAuthenticated,
    /// Another request is in flight.
    InFlight,
}

/// Result of [`SessionStore::begin_request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestGate {
    /// `loading` is now set; the caller dispatches its request.
    Proceed,
    /// Storage has not been restored yet. Nothing was changed.
    NotHydrated,
}

/// Process-wide session container.
///
/// Cloning is cheap and every clone refers to the same session, like an
/// `Arc`. Fields are private: the named operations below are the only way
/// to change anything.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ hydrate() ──→ begin_*/sign_in/set_user/reset ... ──→ drop
///  [empty]   [restored,        [mutated, persisted on
///             hydrated=true]    every user/token change]
/// ```
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    state: watch::Sender<Session>,
    storage: Arc<dyn Storage>,
    config: SessionConfig,
}

impl SessionStore {
    /// Creates an empty, unhydrated store over `storage`.
    ///
    /// Nothing is read yet; call [`hydrate`](Self::hydrate) once at start.
    pub fn new(storage: Arc<dyn Storage>, config: SessionConfig) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            inner: Arc::new(Inner {
                state,
                storage,
                config,
            }),
        }
    }

    // =====================================================================
    // Reads
    // =====================================================================

    /// Returns a copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Subscribes to changes. The receiver sees the current value first.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Returns the current identity.
    pub fn user(&self) -> Option<Identity> {
        self.inner.state.borrow().user.clone()
    }

    /// Returns the current bearer token.
    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().token.clone()
    }

    pub fn is_hydrated(&self) -> bool {
        self.inner.state.borrow().hydrated
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    /// Returns the storage key this store persists under.
    pub fn storage_key(&self) -> &str {
        &self.inner.config.storage_key
    }

    /// Returns the durable storage behind this store.
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.inner.storage
    }

    // =====================================================================
    // Named mutations
    // =====================================================================

    pub fn set_user(&self, user: Option<Identity>) {
        self.mutate(|s| replace(&mut s.user, user));
    }

    pub fn set_token(&self, token: Option<String>) {
        self.mutate(|s| replace(&mut s.token, token));
    }

    pub fn set_loading(&self, loading: bool) {
        self.mutate(|s| replace(&mut s.loading, loading));
    }

    pub fn set_error(&self, error: impl Into<String>) {
        let error = Some(error.into());
        self.mutate(|s| replace(&mut s.error, error));
    }

    pub fn clear_error(&self) {
        self.mutate(|s| replace(&mut s.error, None));
    }

    /// Clears `user`, `token`, `loading` and `error` in one step.
    /// `hydrated` is left alone.
    pub fn reset(&self) {
        self.mutate(|s| {
            let changed = s.user.is_some()
                || s.token.is_some()
                || s.loading
                || s.error.is_some();
            s.user = None;
            s.token = None;
            s.loading = false;
            s.error = None;
            changed
        });
    }

    /// Marks hydration complete, restoring from storage first.
    ///
    /// Same as [`hydrate`](Self::hydrate): the flag cannot be raised
    /// without the restore, and only the first call has any effect.
    pub fn set_hydrated(&self) {
        self.hydrate();
    }

    /// Sets `user` and `token` together, clearing `loading` and `error`.
    ///
    /// One notification, one storage write: subscribers never observe the
    /// new user paired with the old token.
    pub fn sign_in(&self, user: Identity, token: Option<String>) {
        self.mutate(|s| {
            s.user = Some(user);
            s.token = token;
            s.loading = false;
            s.error = None;
            true
        });
    }

    /// Ends a failed login: `user` and `token` cleared, `error` set.
    ///
    /// A failed attempt while already signed in drops the previous
    /// identity as well, and the stored record with it.
    pub fn fail_request(&self, error: impl Into<String>) {
        let error = Some(error.into());
        self.mutate(|s| {
            let changed = s.user.is_some() || s.token.is_some() || s.loading || s.error != error;
            s.user = None;
            s.token = None;
            s.loading = false;
            s.error = error;
            changed
        });
    }

    /// Starts a login/logout request: `loading = true`, `error` cleared.
    ///
    /// Refused before hydration, under the same lock as the change.
    pub fn begin_request(&self) -> RequestGate {
        let mut gate = RequestGate::Proceed;
        self.mutate(|s| {
            if !s.hydrated {
                gate = RequestGate::NotHydrated;
                return false;
            }
            let changed = !s.loading || s.error.is_some();
            s.loading = true;
            s.error = None;
            changed
        });
        gate
    }

    /// Applies the `check_auth` guards and, if they pass, starts the
    /// request, all under one lock so two callers cannot both proceed.
    pub fn begin_verification(&self, force: bool) -> VerifyGate {
        let mut gate = VerifyGate::Proceed;
        self.mutate(|s| {
            gate = if !s.hydrated {
                VerifyGate::NotHydrated
            } else if s.user.is_some() && !force {
                VerifyGate::AlreadyAuthenticated
            } else if s.loading {
                VerifyGate::InFlight
            } else {
                VerifyGate::Proceed
            };
            if gate != VerifyGate::Proceed {
                return false;
            }
            s.loading = true;
            s.error = None;
            true
        });
        gate
    }

    // =====================================================================
    // Hydration
    // =====================================================================

    /// Restores `{ user, token }` from storage and marks the store hydrated.
    ///
    /// Missing or unreadable records restore as an empty session; the
    /// failure is logged, never returned. The restored pair and
    /// `hydrated = true` are applied in the same change, so no subscriber
    /// can see `hydrated` before the restored identity.
    ///
    /// Returns `false` (and does nothing) if the store was already hydrated.
    pub fn hydrate(&self) -> bool {
        if self.is_hydrated() {
            tracing::debug!("session already hydrated, ignoring");
            return false;
        }

        let restored = self.restore();
        let restored_user = restored.user.as_ref().map(|u| u.id.to_string());

        // Not routed through `mutate`: the pair came from storage, so writing
        // it back would be a no-op at best.
        let applied = self.inner.state.send_if_modified(|s| {
            if s.hydrated {
                return false;
            }
            s.user = restored.user;
            s.token = restored.token;
            s.hydrated = true;
            true
        });

        if applied {
            tracing::info!(user = ?restored_user, "session hydrated");
        }
        applied
    }

    /// Reads and decodes the stored record, degrading to empty on failure.
    fn restore(&self) -> PersistedSession {
        let key = self.storage_key();
        let bytes = match self.inner.storage.load(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return PersistedSession::default(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored session");
                return PersistedSession::default();
            }
        };

        match persistence::deserialize(&bytes) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable stored session");
                PersistedSession::default()
            }
        }
    }

    // =====================================================================
    // Internals
    // =====================================================================

    /// Runs `f` under the state lock. `f` returns whether it changed
    /// anything; only then are subscribers notified. If the `{ user, token }`
    /// pair changed, it is persisted before the lock is released.
    fn mutate(&self, f: impl FnOnce(&mut Session) -> bool) -> bool {
        let storage = &self.inner.storage;
        let key = self.inner.config.storage_key.as_str();

        self.inner.state.send_if_modified(|s| {
            let before = (s.user.clone(), s.token.clone());
            if !f(s) {
                return false;
            }
            if before.0 != s.user || before.1 != s.token {
                persist(storage.as_ref(), key, s);
            }
            true
        })
    }
}

/// Writes the pair, or removes the record when the pair is empty.
/// Failures are logged: mutations have no error path.
fn persist(storage: &dyn Storage, key: &str, session: &Session) {
    let result = if session.user.is_none() && session.token.is_none() {
        storage.remove(key)
    } else {
        persistence::serialize(session).and_then(|bytes| storage.save(key, &bytes))
    };
    if let Err(e) = result {
        tracing::warn!(error = %e, "failed to persist session");
    }
}

/// Assigns `value` to `slot`, reporting whether it differed.
fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

impl TokenSource for SessionStore {
    fn bearer_token(&self) -> Option<String> {
        self.token()
    }
}

// =========================================================================
// Tests
// =========================================================================
