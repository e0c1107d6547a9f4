//! The auth gateway: verification, login and logout against the API.
//!
//! Each operation follows the same shape:
//!   1. Mark the session busy (`loading = true`, `error` cleared)
//!   2. Send one request, bounded by the configured timeout
//!   3. Fold the outcome back into the session
//!   4. Settle: `loading` goes back to `false` (logout: full reset)
//!
//! Step 4 is owned by a drop guard, so it also happens when the caller
//! abandons the future halfway (e.g. a page navigates away mid-request).

use std::future::Future;

use warden_protocol::{
    Codec, Identity, JsonCodec, LoginRequest, LoginResponse, UserResponse,
};
use warden_session::{AuthView, RequestGate, SessionStore, VerifyGate};
use warden_transport::{HttpClient, TransportError};

use crate::{AuthError, CredentialError, GatewayConfig};

/// What a [`AuthGateway::check_auth`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// No request was sent; the gate says why.
    Skipped(VerifyGate),
    /// The server confirmed the session; `user` was refreshed.
    Verified,
    /// Verification failed; the session was reset.
    Cleared,
}

/// Settles the session when an operation ends, however it ends.
///
/// `loading` is one flag shared by all operations: a verification settling
/// while a login is in flight clears it early. Login and logout are gated
/// by the UI, not by this flag.
struct Settle<'a> {
    store: &'a SessionStore,
    reset: bool,
}

impl Drop for Settle<'_> {
    fn drop(&mut self) {
        if self.reset {
            self.store.reset();
        } else {
            self.store.set_loading(false);
        }
    }
}

/// Runs the three auth operations over a [`SessionStore`].
///
/// Generic over the HTTP client so tests can script responses and
/// applications can plug in whatever client they already have.
///
/// ```rust,ignore
/// let gateway = AuthGateway::new(store, ReqwestClient::new(base)?, GatewayConfig::default());
/// gateway.login("a@b.com", "secret").await?;
/// assert!(gateway.view().is_authenticated);
/// ```
#[derive(Clone)]
pub struct AuthGateway<C: HttpClient> {
    store: SessionStore,
    client: C,
    config: GatewayConfig,
    codec: JsonCodec,
}

impl<C: HttpClient> AuthGateway<C> {
    pub fn new(store: SessionStore, client: C, config: GatewayConfig) -> Self {
        Self {
            store,
            client,
            config,
            codec: JsonCodec,
        }
    }

    /// The session this gateway mutates.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The HTTP client requests go through.
    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The derived view consumers should read: `loading` is true until both
    /// hydration and any in-flight operation have finished.
    pub fn view(&self) -> AuthView {
        self.store.snapshot().view()
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.snapshot().is_authenticated()
    }

    // =====================================================================
    // check_auth
    // =====================================================================

    /// Confirms the current credential with `GET /user`.
    ///
    /// Does nothing (returns [`VerifyOutcome::Skipped`]) when:
    /// - storage has not been restored yet,
    /// - a user is already present and `force` is `false`,
    /// - another verification or request is in flight.
    ///
    /// Any failure resets the session. A stale identity must never survive
    /// a failed verification.
    pub async fn check_auth(&self, force: bool) -> VerifyOutcome {
        let gate = self.store.begin_verification(force);
        if gate != VerifyGate::Proceed {
            tracing::debug!(?gate, force, "verification skipped");
            return VerifyOutcome::Skipped(gate);
        }
        let _settle = Settle {
            store: &self.store,
            reset: false,
        };

        match self.fetch_user().await {
            Ok(user) => {
                tracing::info!(user = %user.id, "session verified");
                self.store.set_user(Some(user));
                VerifyOutcome::Verified
            }
            Err(e) => {
                tracing::debug!(error = %e, "verification failed, clearing session");
                self.store.reset();
                VerifyOutcome::Cleared
            }
        }
    }

    async fn fetch_user(&self) -> Result<Identity, AuthError> {
        let body = self
            .bounded(self.client.get(&self.config.endpoints.user))
            .await?;
        let response: UserResponse = self.codec.decode(&body)?;
        Ok(response.user)
    }

    // =====================================================================
    // login
    // =====================================================================

    /// Exchanges credentials for an identity with `POST /login`.
    ///
    /// On success the identity (and the token, when the server issues one)
    /// is stored as a unit and returned.
    ///
    /// Before the stored session has been restored, nothing is sent and the
    /// session is not touched.
    ///
    /// # Errors
    /// Returns [`CredentialError`] for rejected credentials, unreachable
    /// server, timeout, or a malformed response. Its message is also stored
    /// in the session's `error` field and `user`/`token` end up unset, even
    /// if a previous login had set them.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, CredentialError> {
        if self.store.begin_request() == RequestGate::NotHydrated {
            tracing::debug!("login refused, session not restored yet");
            return Err(CredentialError::new(AuthError::NotHydrated));
        }
        let _settle = Settle {
            store: &self.store,
            reset: false,
        };

        match self.submit_credentials(email, password).await {
            Ok(response) => {
                let user = response.user;
                tracing::info!(
                    user = %user.id,
                    bearer = response.token.is_some(),
                    "login succeeded"
                );
                self.store.sign_in(user.clone(), response.token);
                Ok(user)
            }
            Err(e) => {
                let err = CredentialError::new(e);
                tracing::info!(status = ?err.status(), error = %err.cause(), "login failed");
                self.store.fail_request(err.message());
                Err(err)
            }
        }
    }

    async fn submit_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, AuthError> {
        let body = self.codec.encode(&LoginRequest::new(email, password))?;
        let response = self
            .bounded(self.client.post(&self.config.endpoints.login, Some(body)))
            .await?;
        Ok(self.codec.decode(&response)?)
    }

    // =====================================================================
    // logout
    // =====================================================================

    /// Ends the session with `POST /logout`, best effort.
    ///
    /// Never fails: if the server cannot be told, the local session is
    /// cleared anyway. Leaving this client must always work.
    ///
    /// Called before start, it restores the stored session first so the
    /// reset below also removes the durable record.
    pub async fn logout(&self) {
        if !self.store.is_hydrated() && self.store.hydrate() {
            tracing::debug!("restored session ahead of logout");
        }
        self.store.begin_request();
        let _settle = Settle {
            store: &self.store,
            reset: true,
        };

        let result = self
            .bounded(self.client.post(&self.config.endpoints.logout, None))
            .await;
        match result {
            Ok(_) => tracing::info!("logged out"),
            Err(e) => tracing::warn!(error = %e, "remote logout failed, clearing local session"),
        }
        self.store.reset();
    }

    // =====================================================================
    // Internals
    // =====================================================================

    /// Applies the configured timeout to a request.
    async fn bounded(
        &self,
        request: impl Future<Output = Result<Vec<u8>, TransportError>>,
    ) -> Result<Vec<u8>, AuthError> {
        match self.config.request_timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .map_err(|_| AuthError::TimedOut(limit))?
                .map_err(AuthError::from),
            None => request.await.map_err(AuthError::from),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `AuthGateway`, driven by `ScriptedClient`.
    //!
    //! Naming convention: `test_{operation}_{scenario}_{expected}`.
    //! Timeout tests run on a paused clock (`start_paused = true`), so a
    //! 10-second timeout elapses instantly once the runtime is idle.

    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use warden_protocol::{Roles, UserId};
    use warden_session::{MemoryStorage, SessionConfig};

    use super::*;
    use crate::testing::{Reply, ScriptedClient};

    // -- Helpers ----------------------------------------------------------

    type Gateway = AuthGateway<Arc<ScriptedClient>>;

    fn gateway(replies: Vec<Reply>) -> (Gateway, Arc<ScriptedClient>) {
        let client = Arc::new(ScriptedClient::with_replies(replies));
        let store = SessionStore::new(Arc::new(MemoryStorage::new()), SessionConfig::default());
        let gw = AuthGateway::new(store, client.clone(), GatewayConfig::default());
        (gw, client)
    }

    /// An unhydrated gateway over `storage`, which already holds user `id`.
    fn over_stored_user(
        id: u64,
        replies: Vec<Reply>,
    ) -> (Gateway, Arc<ScriptedClient>, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let earlier = SessionStore::new(storage.clone(), SessionConfig::default());
        earlier.hydrate();
        earlier.sign_in(identity(id), Some(format!("t{id}")));

        let client = Arc::new(ScriptedClient::with_replies(replies));
        let store = SessionStore::new(storage.clone(), SessionConfig::default());
        let gw = AuthGateway::new(store, client.clone(), GatewayConfig::default());
        (gw, client, storage)
    }

    fn hydrated(replies: Vec<Reply>) -> (Gateway, Arc<ScriptedClient>) {
        let (gw, client) = gateway(replies);
        gw.store().hydrate();
        (gw, client)
    }

    fn user_json(id: u64) -> serde_json::Value {
        json!({ "id": id, "email": format!("u{id}@example.com") })
    }

    fn identity(id: u64) -> Identity {
        Identity::new(UserId::Number(id), format!("u{id}@example.com"), Roles::default())
    }

    fn assert_settled_empty(gw: &Gateway) {
        let s = gw.store().snapshot();
        assert!(s.user.is_none(), "user should be cleared");
        assert!(s.token.is_none(), "token should be cleared");
        assert!(!s.loading, "loading should be cleared");
    }

    // =====================================================================
    // check_auth()
    // =====================================================================

    #[tokio::test]
    async fn test_check_auth_before_hydration_sends_nothing() {
        let (gw, client) = gateway(vec![Reply::Json(json!({ "user": user_json(1) }))]);

        let outcome = gw.check_auth(true).await;

        assert_eq!(outcome, VerifyOutcome::Skipped(VerifyGate::NotHydrated));
        assert_eq!(client.request_count(), 0);
    }

    #[tokio::test]
    async fn test_check_auth_success_sets_user() {
        let (gw, client) = hydrated(vec![Reply::Json(json!({ "user": user_json(1) }))]);

        let outcome = gw.check_auth(false).await;

        assert_eq!(outcome, VerifyOutcome::Verified);
        assert_eq!(gw.store().user(), Some(identity(1)));
        assert!(!gw.store().is_loading());
        assert_eq!(client.requests()[0].path, "/user");
        assert_eq!(client.requests()[0].method, "GET");
    }

    #[tokio::test]
    async fn test_check_auth_with_user_and_no_force_is_skipped() {
        let (gw, client) = hydrated(vec![]);
        gw.store().sign_in(identity(1), None);

        let outcome = gw.check_auth(false).await;

        assert_eq!(
            outcome,
            VerifyOutcome::Skipped(VerifyGate::AlreadyAuthenticated)
        );
        assert_eq!(client.request_count(), 0);
    }

    #[tokio::test]
    async fn test_check_auth_forced_refreshes_identity() {
        let updated = json!({
            "id": 1,
            "email": "u1@example.com",
            "roles": { "isOrganizationAdmin": true }
        });
        let (gw, _) = hydrated(vec![Reply::Json(json!({ "user": updated }))]);
        gw.store().sign_in(identity(1), Some("t1".into()));

        assert_eq!(gw.check_auth(true).await, VerifyOutcome::Verified);

        let s = gw.store().snapshot();
        assert!(s.user.unwrap().roles.is_organization_admin);
        assert_eq!(s.token.as_deref(), Some("t1"), "token is kept");
    }

    #[tokio::test]
    async fn test_check_auth_failure_when_signed_out_leaves_empty_state() {
        let (gw, _) = hydrated(vec![Reply::Status(401, json!({}))]);

        assert_eq!(gw.check_auth(false).await, VerifyOutcome::Cleared);

        assert_settled_empty(&gw);
        assert!(gw.store().snapshot().error.is_none(), "never user-visible");
    }

    #[tokio::test]
    async fn test_check_auth_failure_clears_stale_identity() {
        let (gw, _) = hydrated(vec![Reply::Status(401, json!({ "message": "expired" }))]);
        gw.store().sign_in(identity(1), Some("t1".into()));

        assert_eq!(gw.check_auth(true).await, VerifyOutcome::Cleared);

        assert_settled_empty(&gw);
    }

    #[tokio::test]
    async fn test_check_auth_malformed_body_clears() {
        let (gw, _) = hydrated(vec![Reply::Raw("<html>ok</html>".into())]);
        gw.store().sign_in(identity(1), None);

        assert_eq!(gw.check_auth(true).await, VerifyOutcome::Cleared);

        assert_settled_empty(&gw);
    }

    #[tokio::test]
    async fn test_check_auth_network_error_clears() {
        let (gw, _) = hydrated(vec![Reply::Network]);

        assert_eq!(gw.check_auth(false).await, VerifyOutcome::Cleared);

        assert_settled_empty(&gw);
    }

    #[tokio::test]
    async fn test_check_auth_concurrent_calls_send_one_request() {
        let (gw, client) = hydrated(vec![
            Reply::Json(json!({ "user": user_json(1) })),
            Reply::Json(json!({ "user": user_json(2) })),
        ]);

        let (first, second) = tokio::join!(gw.check_auth(false), gw.check_auth(false));

        assert_eq!(first, VerifyOutcome::Verified);
        assert_eq!(second, VerifyOutcome::Skipped(VerifyGate::InFlight));
        assert_eq!(client.request_count(), 1);
        assert_eq!(gw.store().user(), Some(identity(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_auth_timeout_clears_session() {
        let (gw, _) = hydrated(vec![Reply::Hang]);
        gw.store().sign_in(identity(1), Some("t1".into()));

        assert_eq!(gw.check_auth(true).await, VerifyOutcome::Cleared);

        assert_settled_empty(&gw);
    }

    #[tokio::test]
    async fn test_check_auth_dropped_midway_clears_loading() {
        let (gw, _) = hydrated(vec![Reply::Hang]);

        // Poll once so the request is in flight, then abandon it.
        let result = tokio::time::timeout(Duration::from_millis(10), gw.check_auth(false)).await;
        assert!(result.is_err());

        assert!(!gw.store().is_loading(), "drop guard must clear loading");
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_auth_settling_mid_login_clears_shared_loading() {
        let (gw, _) = hydrated(vec![Reply::Hang, Reply::Hang]);

        let verify = tokio::spawn({
            let gw = gw.clone();
            async move { gw.check_auth(false).await }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        let login = tokio::spawn({
            let gw = gw.clone();
            async move { gw.login("a@b.com", "secret").await }
        });

        // The verification times out at 10 s, the login not before 11 s.
        tokio::time::sleep(Duration::from_millis(9_500)).await;

        assert_eq!(verify.await.unwrap(), VerifyOutcome::Cleared);
        assert!(!login.is_finished());
        assert!(!gw.store().is_loading(), "one flag for every operation");
        login.abort();
    }

    // =====================================================================
    // login()
    // =====================================================================

    #[tokio::test]
    async fn test_login_success_with_token_signs_in() {
        let (gw, client) = hydrated(vec![Reply::Json(json!({
            "user": user_json(1),
            "token": "t1"
        }))]);

        let user = gw.login("a@b.com", "secret").await.expect("login ok");

        assert_eq!(user.id, UserId::Number(1));
        let s = gw.store().snapshot();
        assert_eq!(s.user, Some(identity(1)));
        assert_eq!(s.token.as_deref(), Some("t1"));
        assert!(!s.loading);
        assert!(s.error.is_none());

        let sent = &client.requests()[0];
        assert_eq!(sent.method, "POST");
        assert_eq!(sent.path, "/login");
        assert_eq!(
            sent.body,
            Some(json!({ "email": "a@b.com", "password": "secret" }))
        );
    }

    #[tokio::test]
    async fn test_login_success_cookie_style_has_no_token() {
        let (gw, _) = hydrated(vec![Reply::Json(json!({ "user": user_json(3) }))]);

        gw.login("a@b.com", "secret").await.expect("login ok");

        let s = gw.store().snapshot();
        assert_eq!(s.user, Some(identity(3)));
        assert_eq!(s.token, None);
    }

    #[tokio::test]
    async fn test_login_rejected_reports_server_message() {
        let (gw, _) = hydrated(vec![Reply::Status(
            401,
            json!({ "message": "Invalid credentials" }),
        )]);

        let err = gw.login("a@b.com", "wrong").await.unwrap_err();

        assert_eq!(err.message(), "Invalid credentials");
        let s = gw.store().snapshot();
        assert!(s.user.is_none());
        assert!(s.token.is_none());
        assert_eq!(s.error.as_deref(), Some("Invalid credentials"));
        assert!(!s.loading);
    }

    #[tokio::test]
    async fn test_login_rejected_without_message_is_generic() {
        let (gw, _) = hydrated(vec![Reply::RawStatus(500, "Internal Server Error".into())]);

        let err = gw.login("a@b.com", "secret").await.unwrap_err();

        assert_eq!(err.message(), crate::error::GENERIC_LOGIN_FAILURE);
        assert_eq!(
            gw.store().snapshot().error.as_deref(),
            Some(crate::error::GENERIC_LOGIN_FAILURE)
        );
    }

    #[tokio::test]
    async fn test_login_network_failure_reports_unreachable() {
        let (gw, _) = hydrated(vec![Reply::Network]);

        let err = gw.login("a@b.com", "secret").await.unwrap_err();

        assert_eq!(err.message(), crate::error::UNREACHABLE);
        assert!(gw.store().user().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_timeout_reports_timeout() {
        let (gw, _) = hydrated(vec![Reply::Hang]);

        let err = gw.login("a@b.com", "secret").await.unwrap_err();

        assert_eq!(err.message(), crate::error::TIMED_OUT);
        assert!(!gw.store().is_loading());
    }

    #[tokio::test]
    async fn test_login_before_hydration_sends_nothing() {
        let (gw, client, _) = over_stored_user(
            7,
            vec![Reply::Json(json!({ "user": user_json(1), "token": "t1" }))],
        );

        let err = gw.login("a@b.com", "secret").await.unwrap_err();

        assert!(matches!(err.cause(), AuthError::NotHydrated));
        assert_eq!(err.message(), crate::error::NOT_READY);
        assert_eq!(client.request_count(), 0);
        let s = gw.store().snapshot();
        assert!(!s.hydrated && !s.loading);
        assert!(s.user.is_none() && s.error.is_none(), "session untouched");

        // The stored identity is still there for start-up to restore.
        assert!(gw.store().hydrate());
        assert_eq!(gw.store().user(), Some(identity(7)));
    }

    #[tokio::test]
    async fn test_login_failure_while_signed_in_clears_previous_session() {
        let (gw, _) = hydrated(vec![Reply::Status(
            401,
            json!({ "message": "Invalid credentials" }),
        )]);
        gw.store().sign_in(identity(1), Some("t1".into()));

        gw.login("other@b.com", "wrong").await.unwrap_err();

        let s = gw.store().snapshot();
        assert!(s.user.is_none());
        assert!(s.token.is_none());
        assert!(!s.loading);
        assert_eq!(s.error.as_deref(), Some("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_login_success_clears_previous_error() {
        let (gw, _) = hydrated(vec![
            Reply::Status(401, json!({ "message": "Invalid credentials" })),
            Reply::Json(json!({ "user": user_json(1), "token": "t1" })),
        ]);

        let _ = gw.login("a@b.com", "wrong").await;
        gw.login("a@b.com", "secret").await.expect("second attempt ok");

        assert!(gw.store().snapshot().error.is_none());
    }

    // =====================================================================
    // logout()
    // =====================================================================

    #[tokio::test]
    async fn test_logout_success_clears_session() {
        let (gw, client) = hydrated(vec![Reply::Json(json!({}))]);
        gw.store().sign_in(identity(1), Some("t1".into()));

        gw.logout().await;

        assert_settled_empty(&gw);
        assert_eq!(client.requests()[0].path, "/logout");
        assert_eq!(client.requests()[0].body, None);
    }

    #[tokio::test]
    async fn test_logout_server_failure_still_clears_session() {
        let (gw, _) = hydrated(vec![Reply::Status(500, json!({}))]);
        gw.store().sign_in(identity(1), Some("t1".into()));

        gw.logout().await;

        assert_settled_empty(&gw);
    }

    #[tokio::test]
    async fn test_logout_when_signed_out_is_idempotent() {
        for reply in [Reply::Json(json!({})), Reply::Network] {
            let (gw, _) = hydrated(vec![reply]);

            gw.logout().await;

            assert_settled_empty(&gw);
            assert!(gw.store().snapshot().error.is_none());
        }
    }

    #[tokio::test]
    async fn test_logout_before_hydration_clears_storage() {
        let (gw, client, storage) = over_stored_user(7, vec![Reply::Json(json!({}))]);

        gw.logout().await;

        assert!(gw.store().is_hydrated());
        assert_settled_empty(&gw);
        assert!(storage.get("warden.session").is_none());
        assert!(!gw.store().hydrate(), "nothing left to restore");
        assert!(gw.store().user().is_none());

        // The server is still told.
        assert_eq!(client.requests()[0].path, "/logout");
        let restarted = SessionStore::new(storage, SessionConfig::default());
        restarted.hydrate();
        assert!(restarted.user().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_unreachable_server_clears_after_timeout() {
        let (gw, _) = hydrated(vec![Reply::Hang]);
        gw.store().sign_in(identity(1), Some("t1".into()));

        gw.logout().await;

        assert_settled_empty(&gw);
    }

    // =====================================================================
    // view()
    // =====================================================================

    #[tokio::test]
    async fn test_view_is_loading_until_hydrated() {
        let (gw, _) = gateway(vec![]);
        assert!(gw.view().loading);

        gw.store().hydrate();

        let view = gw.view();
        assert!(!view.loading);
        assert!(!view.is_authenticated);
    }

    #[tokio::test]
    async fn test_custom_endpoints_are_used() {
        let client = Arc::new(ScriptedClient::with_replies([Reply::Json(
            json!({ "user": user_json(1) }),
        )]));
        let store = SessionStore::new(Arc::new(MemoryStorage::new()), SessionConfig::default());
        store.hydrate();
        let mut config = GatewayConfig::default();
        config.endpoints.user = "/api/auth/me".into();
        let gw = AuthGateway::new(store, client.clone(), config);

        gw.check_auth(false).await;

        assert_eq!(client.requests()[0].path, "/api/auth/me");
    }
}
