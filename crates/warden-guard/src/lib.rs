//! Route gating for Warden.
//!
//! Decides, for one screen, whether to render it, render nothing yet, or
//! send the user somewhere else:
//!
//! ```text
//! not hydrated or loading        → RenderNothing
//! not authenticated              → Redirect(login path)
//! role required and not held     → Redirect(fallback path)
//! otherwise                      → RenderChildren
//! ```
//!
//! # Key types
//!
//! - [`decide`]: the pure decision over an [`AuthView`] snapshot
//! - [`GateConfig`]: paths and the role a screen requires
//! - [`RouteGuard`]: remembers the last decision so redirects fire once
//! - [`Navigator`]: whatever performs the redirect in your UI

mod config;
mod decision;
mod guard;

pub use config::{GateConfig, RoleRequirement};
pub use decision::{decide, has_role, render, Decision};
pub use guard::{Navigator, RouteGuard};
pub use warden_protocol::Role;
pub use warden_session::AuthView;
