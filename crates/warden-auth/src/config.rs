//! Gateway configuration.

use std::time::Duration;

/// Request paths of the three endpoints, relative to the client's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Verification endpoint. Default: `/user`.
    pub user: String,
    /// Credential endpoint. Default: `/login`.
    pub login: String,
    /// Invalidation endpoint. Default: `/logout`.
    pub logout: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            user: "/user".to_string(),
            login: "/login".to_string(),
            logout: "/logout".to_string(),
        }
    }
}

/// Configuration for [`AuthGateway`](crate::AuthGateway).
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub endpoints: Endpoints,

    /// Upper bound on any single request. A request that takes longer fails
    /// like any other: verification clears the session, login reports a
    /// timeout message, logout clears locally.
    ///
    /// Default: 10 seconds. `None` waits forever.
    pub request_timeout: Option<Duration>,
}

impl GatewayConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            request_timeout: Some(Self::DEFAULT_TIMEOUT),
        }
    }
}
