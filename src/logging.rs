//! Structured logging initialization. The core itself never configures a
//! subscriber — `Router::dispatch` and `Router::complete` only emit spans
//! and events through `tracing`'s facade — but the demo binary needs one
//! concrete setup, so it lives here for any host to reuse.

use tracing_subscriber::EnvFilter;

/// Installs a `tracing_subscriber::fmt` subscriber with an `EnvFilter`
/// seeded from `level` (overridable by `RUST_LOG` at runtime). Call once,
/// at process startup.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
