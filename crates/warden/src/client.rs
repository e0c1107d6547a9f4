//! `WardenClient` builder and start-up.
//!
//! This is the entry point for applications. It ties together all the
//! layers: storage → session → auth → guard.

use std::sync::Arc;

use tokio::sync::watch;
use warden_auth::{AuthGateway, AuthView, CredentialError, VerifyOutcome};
use warden_guard::{GateConfig, Navigator, RouteGuard};
use warden_protocol::Identity;
use warden_session::{
    persistence, FileStorage, MemoryStorage, PersistedSession, Session, SessionStore, Storage,
};
use warden_transport::{HttpClient, ReqwestClient, TokenSource};

use crate::{WardenConfig, WardenError};

/// Builder for a [`WardenClient`].
///
/// # Example
///
/// ```rust,ignore
/// let client = WardenClient::builder()
///     .config(WardenConfig::from_env()?)
///     .build()?;
/// client.start().await;
/// ```
pub struct WardenClientBuilder {
    config: WardenConfig,
    storage: Option<Arc<dyn Storage>>,
}

impl WardenClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: WardenConfig::default(),
            storage: None,
        }
    }

    pub fn config(mut self, config: WardenConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the storage chosen from `storage_dir`.
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Builds a client over the default `reqwest` transport.
    ///
    /// The transport reads the bearer token from the session store, so a
    /// token issued at login is sent on every later request.
    ///
    /// # Errors
    /// Returns [`WardenError::Transport`] if the HTTP client cannot be built.
    pub fn build(self) -> Result<WardenClient<ReqwestClient>, WardenError> {
        let store = self.store();
        let tokens: Arc<dyn TokenSource> = Arc::new(store.clone());
        let http = ReqwestClient::new(&self.config.api_base_url)?.with_token_source(tokens);
        Ok(WardenClient::assemble(self.config, store, http))
    }

    /// Builds a client over a caller-supplied transport.
    pub fn build_with<C: HttpClient>(self, http: C) -> WardenClient<C> {
        let store = self.store();
        WardenClient::assemble(self.config, store, http)
    }

    fn store(&self) -> SessionStore {
        let storage: Arc<dyn Storage> = match (&self.storage, &self.config.storage_dir) {
            (Some(storage), _) => storage.clone(),
            (None, Some(dir)) => Arc::new(FileStorage::new(dir.clone())),
            (None, None) => Arc::new(MemoryStorage::new()),
        };
        SessionStore::new(storage, self.config.session_config())
    }
}

impl Default for WardenClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A configured session and authorization layer.
///
/// Cloning is cheap; clones share the session.
#[derive(Clone)]
pub struct WardenClient<C: HttpClient = ReqwestClient> {
    config: WardenConfig,
    gateway: AuthGateway<C>,
}

impl WardenClient<ReqwestClient> {
    /// Creates a new builder.
    pub fn builder() -> WardenClientBuilder {
        WardenClientBuilder::new()
    }

    /// Shorthand for `builder().config(config).build()`.
    ///
    /// # Errors
    /// See [`WardenClientBuilder::build`].
    pub fn from_config(config: WardenConfig) -> Result<Self, WardenError> {
        WardenClientBuilder::new().config(config).build()
    }
}

impl<C: HttpClient> WardenClient<C> {
    fn assemble(config: WardenConfig, store: SessionStore, http: C) -> Self {
        let gateway = AuthGateway::new(store, http, config.gateway_config());
        Self { config, gateway }
    }

    /// Restores the persisted session and, if an identity came back,
    /// verifies it with the server.
    ///
    /// Returns `None` when nothing was verified: storage held no identity,
    /// or the session had already been restored (by an earlier `start` or
    /// a `logout` before it).
    pub async fn start(&self) -> Option<VerifyOutcome> {
        let store = self.gateway.store();
        if !store.hydrate() {
            tracing::debug!("client already started");
            return None;
        }
        if store.user().is_none() {
            tracing::debug!("no stored identity, skipping verification");
            return None;
        }
        Some(self.gateway.check_auth(true).await)
    }

    pub fn config(&self) -> &WardenConfig {
        &self.config
    }

    pub fn gateway(&self) -> &AuthGateway<C> {
        &self.gateway
    }

    pub fn store(&self) -> &SessionStore {
        self.gateway.store()
    }

    pub fn view(&self) -> AuthView {
        self.gateway.view()
    }

    /// Subscribes to session changes, e.g. for [`RouteGuard::watch`].
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.store().subscribe()
    }

    pub async fn check_auth(&self, force: bool) -> VerifyOutcome {
        self.gateway.check_auth(force).await
    }

    /// Signs in.
    ///
    /// # Errors
    /// Returns [`CredentialError`] if the login was rejected or could not
    /// complete; its message is also in the session's `error` field.
    /// Before [`start`](Self::start) nothing is sent and the error's cause
    /// is `AuthError::NotHydrated`.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, CredentialError> {
        self.gateway.login(email, password).await
    }

    pub async fn logout(&self) {
        self.gateway.logout().await;
    }

    /// A gate with the configured login and landing paths.
    pub fn gate(&self) -> GateConfig {
        self.config.gate()
    }

    /// Creates a guard for one screen.
    pub fn guard<N: Navigator>(&self, gate: GateConfig, navigator: N) -> RouteGuard<N> {
        RouteGuard::new(gate, navigator)
    }

    /// Reads the record currently in durable storage, bypassing the store.
    ///
    /// # Errors
    /// Returns [`WardenError::Session`] if storage cannot be read or the
    /// record is corrupt.
    pub fn persisted(&self) -> Result<PersistedSession, WardenError> {
        let store = self.store();
        match store.storage().load(store.storage_key())? {
            Some(bytes) => Ok(persistence::deserialize(&bytes)?),
            None => Ok(PersistedSession::default()),
        }
    }
}
