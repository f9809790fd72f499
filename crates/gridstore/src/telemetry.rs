//! Opt-in log output for the spans and events emitted by the stores.

use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the filter directives, e.g. `GRIDSTORE_LOG=gridstore=debug`.
pub const LOG_ENV: &str = "GRIDSTORE_LOG";

/// Install a global fmt subscriber filtered by [`LOG_ENV`] (default `warn`).
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).try_init().is_ok()
}

/// Like [`init_tracing`], writing through the test harness's captured output.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
}
