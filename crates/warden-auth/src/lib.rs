//! Authentication flows for Warden.
//!
//! The [`AuthGateway`] reconciles the local session with the server through
//! three operations:
//!
//! 1. **Verification**: [`AuthGateway::check_auth`] asks `GET /user`
//!    whether the current credential is still good
//! 2. **Login**: [`AuthGateway::login`] exchanges email and password for an
//!    identity (and, for bearer deployments, a token)
//! 3. **Logout**: [`AuthGateway::logout`] tells the server, then clears the
//!    local session no matter what the server said
//!
//! Only a failed login produces an error the caller sees
//! ([`CredentialError`]). Every other failure is absorbed into the session:
//! a failed verification or logout simply leaves the client signed out.

mod config;
mod error;
mod gateway;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::{Endpoints, GatewayConfig};
pub use error::{AuthError, CredentialError};
pub use gateway::{AuthGateway, VerifyOutcome};
pub use warden_session::AuthView;
