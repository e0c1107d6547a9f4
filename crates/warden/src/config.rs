//! Client configuration with environment overrides.
//!
//! Values come from [`WardenConfig::default`] (or a deserialized file), then
//! `WARDEN_*` environment variables override them. Blank variables are
//! ignored. Configuration values are not secrets; none belong here.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use warden_auth::GatewayConfig;
use warden_guard::GateConfig;
use warden_session::SessionConfig;

use crate::WardenError;

pub const ENV_API_BASE_URL: &str = "WARDEN_API_BASE_URL";
pub const ENV_STORAGE_DIR: &str = "WARDEN_STORAGE_DIR";
pub const ENV_STORAGE_KEY: &str = "WARDEN_STORAGE_KEY";
pub const ENV_LOGIN_PATH: &str = "WARDEN_LOGIN_PATH";
pub const ENV_LANDING_PATH: &str = "WARDEN_LANDING_PATH";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "WARDEN_REQUEST_TIMEOUT_MS";

/// Everything a [`WardenClient`](crate::WardenClient) needs to start.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Base URL the auth endpoints are resolved against.
    pub api_base_url: String,

    /// Directory for the persisted session. `None` keeps the session in
    /// memory only, so nothing survives a restart.
    pub storage_dir: Option<PathBuf>,

    /// Key the session is stored under.
    pub storage_key: String,

    pub login_path: String,

    /// Where an authenticated user lands by default.
    pub landing_path: String,

    /// Per-request timeout in milliseconds. `0` or `None` disables it.
    pub request_timeout_ms: Option<u64>,
}

impl Default for WardenConfig {
    fn default() -> Self {
        let gate = GateConfig::default();
        Self {
            api_base_url: "http://127.0.0.1:8080".to_string(),
            storage_dir: None,
            storage_key: SessionConfig::default().storage_key,
            login_path: gate.login_path,
            landing_path: gate.landing_path,
            request_timeout_ms: Some(GatewayConfig::DEFAULT_TIMEOUT.as_millis() as u64),
        }
    }
}

impl WardenConfig {
    /// Defaults with `WARDEN_*` environment overrides applied.
    ///
    /// # Errors
    /// Returns [`WardenError::Config`] if `WARDEN_REQUEST_TIMEOUT_MS` is not
    /// a number.
    pub fn from_env() -> Result<Self, WardenError> {
        Self::default().with_env()
    }

    /// Applies `WARDEN_*` environment overrides on top of `self`.
    ///
    /// # Errors
    /// See [`from_env`](Self::from_env).
    pub fn with_env(self) -> Result<Self, WardenError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, WardenError> {
        let get = |name: &str| lookup(name).as_deref().and_then(normalize_value);

        if let Some(value) = get(ENV_API_BASE_URL) {
            self.api_base_url = value;
        }
        if let Some(value) = get(ENV_STORAGE_DIR) {
            self.storage_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = get(ENV_STORAGE_KEY) {
            self.storage_key = value;
        }
        if let Some(value) = get(ENV_LOGIN_PATH) {
            self.login_path = value;
        }
        if let Some(value) = get(ENV_LANDING_PATH) {
            self.landing_path = value;
        }
        if let Some(value) = get(ENV_REQUEST_TIMEOUT_MS) {
            let ms = value.parse::<u64>().map_err(|_| {
                WardenError::Config(format!("{ENV_REQUEST_TIMEOUT_MS}: `{value}` is not a number"))
            })?;
            self.request_timeout_ms = Some(ms);
        }
        Ok(self)
    }

    /// The request timeout, if one applies.
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_ms {
            Some(0) | None => None,
            Some(ms) => Some(Duration::from_millis(ms)),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            storage_key: self.storage_key.clone(),
        }
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            request_timeout: self.request_timeout(),
            ..GatewayConfig::default()
        }
    }

    /// A gate with this configuration's paths and no role requirement.
    pub fn gate(&self) -> GateConfig {
        GateConfig::default()
            .login_path(self.login_path.as_str())
            .landing_path(self.landing_path.as_str())
    }
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
