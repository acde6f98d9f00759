use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Installs the global subscriber: `RUST_LOG` filter (falling back to
/// `default_filter`) plus a fmt layer. Fails if one is already installed.
pub fn init_tracing(default_filter: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
