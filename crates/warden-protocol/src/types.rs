//! Identity model and wire bodies.
//!
//! Everything here is either received from the application API or written
//! to durable storage, so every type is `Serialize + Deserialize` and the
//! field names follow the API's camelCase JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A user's identifier as the server reports it.
///
/// Backends disagree on whether ids are numbers or strings (UUIDs, slugs),
/// and the client never does arithmetic on them, so both are accepted.
/// `#[serde(untagged)]` means the JSON is just `1` or `"u-1"`, no wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(u64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// The two role flags the client gates routes on.
///
/// Missing flags deserialize as `false`: an identity without a `roles`
/// object is a plain user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roles {
    #[serde(default)]
    pub is_super_admin: bool,
    #[serde(default)]
    pub is_organization_admin: bool,
}

/// The authenticated principal.
///
/// Only `id`, `email` and `roles` mean anything to Warden. Any other field
/// the server sends (name, avatar, organization...) is kept in `profile` so
/// it survives a persist/restore cycle untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub roles: Roles,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl Identity {
    /// Creates an identity with no profile fields.
    pub fn new(id: UserId, email: impl Into<String>, roles: Roles) -> Self {
        Self {
            id,
            email: email.into(),
            roles,
            profile: Map::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// A role a route can require.
///
/// Configuration spells these `super_admin` and `organization_admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    OrganizationAdmin,
}

impl Role {
    /// The configuration name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::OrganizationAdmin => "organization_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "super_admin" => Ok(Self::SuperAdmin),
            "organization_admin" => Ok(Self::OrganizationAdmin),
            other => Err(ProtocolError::InvalidValue(format!(
                "unknown role `{other}`"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

/// `POST /login` body.
///
/// `Debug` is implemented by hand so the password never reaches a log line.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `POST /login` success body. `token` is present only for bearer-token
/// deployments; cookie-based servers omit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: Identity,
    #[serde(default)]
    pub token: Option<String>,
}

/// `GET /user` success body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: Identity,
}

/// Error body some endpoints return alongside a 4xx status.
///
/// Every field is optional: servers that send plain text or a different
/// shape still decode, just without a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =====================================================================
    // UserId
    // =====================================================================

    #[test]
    fn test_user_id_accepts_numbers_and_strings() {
        let n: UserId = serde_json::from_str("1").unwrap();
        let s: UserId = serde_json::from_str(r#""u-1""#).unwrap();

        assert_eq!(n, UserId::Number(1));
        assert_eq!(s, UserId::Text("u-1".into()));
        assert_eq!(n.to_string(), "1");
        assert_eq!(s.to_string(), "u-1");
    }

    // =====================================================================
    // Identity
    // =====================================================================

    #[test]
    fn test_identity_reads_camel_case_roles() {
        let json = r#"{
            "id": 1,
            "email": "a@b.com",
            "roles": { "isSuperAdmin": true, "isOrganizationAdmin": false }
        }"#;

        let identity: Identity = serde_json::from_str(json).unwrap();

        assert!(identity.roles.is_super_admin);
        assert!(!identity.roles.is_organization_admin);
    }

    #[test]
    fn test_identity_without_roles_is_plain_user() {
        let identity: Identity =
            serde_json::from_str(r#"{"id":1,"email":"a@b.com"}"#).unwrap();

        assert_eq!(identity.roles, Roles::default());
    }

    #[test]
    fn test_identity_keeps_profile_fields() {
        // Unknown fields land in `profile` and are written back out, so a
        // restored identity looks exactly like the one the server sent.
        let json = r#"{"id":1,"email":"a@b.com","name":"Ada","orgId":9}"#;

        let identity: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.profile["name"], "Ada");
        assert_eq!(identity.profile["orgId"], 9);

        let out = serde_json::to_value(&identity).unwrap();
        assert_eq!(out["name"], "Ada");
        assert_eq!(out["roles"]["isSuperAdmin"], false);
    }

    // =====================================================================
    // Role
    // =====================================================================

    #[test]
    fn test_role_parses_configuration_names() {
        assert_eq!("super_admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!(
            " organization_admin ".parse::<Role>().unwrap(),
            Role::OrganizationAdmin
        );
    }

    #[test]
    fn test_role_rejects_unknown_name() {
        let err = "owner".parse::<Role>().unwrap_err();
        assert!(err.to_string().contains("owner"));
    }

    #[test]
    fn test_role_json_matches_configuration_names() {
        let json = serde_json::to_value(Role::OrganizationAdmin).unwrap();
        assert_eq!(json, "organization_admin");
    }

    // =====================================================================
    // Bodies
    // =====================================================================

    #[test]
    fn test_login_request_debug_redacts_password() {
        let req = LoginRequest::new("a@b.com", "hunter2");

        let printed = format!("{req:?}");

        assert!(printed.contains("a@b.com"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_login_response_token_is_optional() {
        let cookie_style: LoginResponse =
            serde_json::from_str(r#"{"user":{"id":1,"email":"a@b.com"}}"#)
                .unwrap();
        let bearer_style: LoginResponse = serde_json::from_str(
            r#"{"user":{"id":1,"email":"a@b.com"},"token":"t1"}"#,
        )
        .unwrap();

        assert_eq!(cookie_style.token, None);
        assert_eq!(bearer_style.token.as_deref(), Some("t1"));
    }

    #[test]
    fn test_error_body_tolerates_other_shapes() {
        let with: ErrorBody =
            serde_json::from_str(r#"{"message":"Invalid credentials"}"#).unwrap();
        let without: ErrorBody = serde_json::from_str(r#"{"error":"x"}"#).unwrap();

        assert_eq!(with.message.as_deref(), Some("Invalid credentials"));
        assert_eq!(without.message, None);
    }
}
