//! Logging bootstrap
//!
//! Installs a global `tracing` subscriber. Filtering follows `RUST_LOG`
//! (default `info`); `XAUTH_LOG_JSON=1` switches to JSON lines.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed (e.g. by a test
/// harness or the embedding application), in which case nothing changes.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let installed = if json_output_requested() {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        tracing::debug!("tracing initialized");
    }
    installed
}

fn json_output_requested() -> bool {
    std::env::var("XAUTH_LOG_JSON")
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
