//! `catalog-observability` — process-wide tracing/logging setup.
//!
//! Structured JSON logs, filtered via `RUST_LOG`. Service and engine code
//! emit through the `tracing` macros; this crate only owns the subscriber.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times; subsequent calls are no-ops, so tests can
/// call it freely.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
