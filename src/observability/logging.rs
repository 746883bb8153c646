//! Structured logging.
//!
//! Uses the tracing crate; log level comes from `RUST_LOG` when set,
//! otherwise from configuration.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `default_level` is the configured fallback used when `RUST_LOG` is absent.
pub fn init_logging(default_level: &str) {
    let fallback = format!("edge_gateway={},tower_http=info", default_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
