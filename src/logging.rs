//! Logging setup
//!
//! The library only emits `tracing` events. Binaries call [`init_tracing`]
//! once to print them to stderr, keeping stdout free for command output.

use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` wins, otherwise `default_level` applies.
#[must_use]
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Compact stderr subscriber, not yet installed anywhere.
pub fn subscriber(default_level: &str) -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish()
}

/// Install [`subscriber`] as the global default. Safe to call more than once.
pub fn init_tracing(default_level: &str) {
    let _ = subscriber(default_level).try_init();
}
