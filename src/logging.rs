//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber: `RUST_LOG` when set, otherwise library
/// events at info and everything else at warn. Safe to call more than once;
/// later calls are no-ops.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("adagio=info,warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
