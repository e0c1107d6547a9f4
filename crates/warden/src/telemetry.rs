//! Log output setup.
//!
//! Warden itself only emits `tracing` events. Applications that have no
//! subscriber of their own can install a plain formatter here.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

use crate::WardenError;

/// Installs a global `fmt` subscriber filtered by `RUST_LOG`, defaulting to
/// `info`.
///
/// # Errors
/// Returns [`WardenError::Telemetry`] if a global subscriber is already set.
pub fn init() -> Result<(), WardenError> {
    init_with(LevelFilter::INFO)
}

/// Like [`init`] with a different default level.
///
/// # Errors
/// See [`init`].
pub fn init_with(default_level: LevelFilter) -> Result<(), WardenError> {
    // RUST_LOG=
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer().with_target(true);

    let subscriber = Registry::default().with(env_filter).with(fmt_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| WardenError::Telemetry(e.to_string()))
}
