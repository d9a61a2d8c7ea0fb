//! Logging setup.
//!
//! The crates in this workspace only emit `tracing` events; nothing is
//! printed until a subscriber is installed. Applications that don't
//! bring their own can call [`init`].

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::WordrushError;

/// Installs a global `fmt` subscriber filtered by `RUST_LOG`, falling
/// back to `info`.
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init() -> Result<(), WordrushError> {
    init_with_default("info")
}

/// Like [`init`], but with a custom fallback filter used when `RUST_LOG`
/// is unset or invalid (e.g. `"wordrush=debug,info"`).
pub fn init_with_default(default_filter: &str) -> Result<(), WordrushError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()?;
    Ok(())
}
