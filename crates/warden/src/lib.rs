//! # Warden
//!
//! Client-side session and authorization layer for multi-role web
//! applications.
//!
//! Warden answers three questions at any point in time: is this client
//! signed in, what role does the identity carry, and may the current screen
//! render or must it redirect. It ties the layers together:
//! storage → session → auth → guard.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use warden::prelude::*;
//!
//! # async fn run() -> Result<(), WardenError> {
//! let client = WardenClient::from_config(WardenConfig::from_env()?)?;
//! client.start().await;
//!
//! let mut guard = client.guard(client.gate().require(Role::OrganizationAdmin), |path: &str| {
//!     println!("navigate to {path}");
//! });
//! let decision = guard.evaluate(&client.view());
//! # let _ = decision;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
pub mod telemetry;

pub use client::{WardenClient, WardenClientBuilder};
pub use config::WardenConfig;
pub use error::WardenError;

pub use warden_auth as auth;
pub use warden_guard as guard;
pub use warden_protocol as protocol;
pub use warden_session as session;
pub use warden_transport as transport;

pub mod prelude {
    pub use crate::{WardenClient, WardenConfig, WardenError};
    pub use warden_auth::{AuthGateway, AuthView, CredentialError, VerifyOutcome};
    pub use warden_guard::{decide, has_role, render, Decision, GateConfig, Navigator, Role, RouteGuard};
    pub use warden_protocol::{Identity, Roles, UserId};
    pub use warden_session::{FileStorage, MemoryStorage, SessionStore, Storage};
    pub use warden_transport::{HttpClient, ReqwestClient};
}
