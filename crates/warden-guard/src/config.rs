//! Gate configuration.

use std::fmt;
use std::str::FromStr;

use warden_protocol::{ProtocolError, Role};

// ---------------------------------------------------------------------------
// RoleRequirement
// ---------------------------------------------------------------------------

/// The role a screen requires, if any.
///
/// Parses from the configuration strings `super_admin` and
/// `organization_admin`; an empty string means no requirement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RoleRequirement(Option<Role>);

impl RoleRequirement {
    /// No role required: any authenticated user passes.
    pub const NONE: Self = Self(None);

    pub fn role(&self) -> Option<Role> {
        self.0
    }

    pub fn is_required(&self) -> bool {
        self.0.is_some()
    }
}

impl From<Role> for RoleRequirement {
    fn from(role: Role) -> Self {
        Self(Some(role))
    }
}

impl From<Option<Role>> for RoleRequirement {
    fn from(role: Option<Role>) -> Self {
        Self(role)
    }
}

impl FromStr for RoleRequirement {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::NONE);
        }
        Ok(Self(Some(s.parse()?)))
    }
}

impl fmt::Display for RoleRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(role) => role.fmt(f),
            None => f.write_str("none"),
        }
    }
}

// ---------------------------------------------------------------------------
// GateConfig
// ---------------------------------------------------------------------------

/// Where a gate sends people, and what it requires of them.
///
/// ```rust,ignore
/// let admin_only = GateConfig::default()
///     .require(Role::SuperAdmin)
///     .fallback("/dashboard");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Where unauthenticated users go. Default: `/login`.
    pub login_path: String,

    /// The generic page for any authenticated user. Default: `/dashboard`.
    pub landing_path: String,

    /// Where authenticated users without the required role go.
    /// Unset, or equal to `login_path`, means `landing_path`.
    pub fallback_path: Option<String>,

    pub role: RoleRequirement,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            landing_path: "/dashboard".to_string(),
            fallback_path: None,
            role: RoleRequirement::NONE,
        }
    }
}

impl GateConfig {
    /// Requires `role` (or one that subsumes it).
    pub fn require(mut self, role: impl Into<RoleRequirement>) -> Self {
        self.role = role.into();
        self
    }

    /// Sets where users lacking the role are sent.
    pub fn fallback(mut self, path: impl Into<String>) -> Self {
        self.fallback_path = Some(path.into());
        self
    }

    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn landing_path(mut self, path: impl Into<String>) -> Self {
        self.landing_path = path.into();
        self
    }

    /// The fallback actually used.
    ///
    /// An authenticated user is never sent back to the login screen for
    /// lacking a role; that would look like a logout.
    pub fn resolved_fallback(&self) -> &str {
        match self.fallback_path.as_deref() {
            Some(path) if path != self.login_path => path,
            _ => &self.landing_path,
        }
    }
}
