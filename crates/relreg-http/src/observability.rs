//! Logging setup and request spans.

use std::sync::Once;

use tracing::Span;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub use crate::config::LogFormat;

static INIT: Once = Once::new();

/// Install the global subscriber.
///
/// Filtering follows `RUST_LOG` and defaults to `info`. Only the first call
/// has an effect.
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        match format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json())
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().pretty())
                    .init();
            }
        }
    });
}

/// Span wrapping one engine call made on behalf of a request.
pub fn resolve_span(operation: &'static str, key: &str) -> Span {
    tracing::debug_span!("resolve", op = operation, key = key)
}
