//! Console diagnostics.
//!
//! Sink failures and task lifecycle events are emitted with `tracing`.
//! Binaries call [`init_logging`] once to see them.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a fmt subscriber filtered by `RUST_LOG`, or `default_filter`.
///
/// Does nothing if a global subscriber is already set.
pub fn init_logging(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
