//! Diagnostic logging.
//!
//! Logs go to stderr so stdout carries only the check report.

use tracing_subscriber::EnvFilter;

/// Filter used when RUST_LOG is unset or invalid
pub const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
