use tracing::{info, Subscriber};
use tracing_subscriber::{fmt, prelude::*, registry::LookupSpan, EnvFilter};

use crate::Environment;

/// Install the global subscriber for a service.
///
/// `RUST_LOG` takes precedence. Otherwise the filter comes from the [Environment], which also picks
/// between human readable output (development) and one JSON object per line (production).
pub fn setup_tracing<S>(subscriber: S, service_name: &str, environment: Environment)
where
    S: Subscriber + for<'a> LookupSpan<'a> + Send + Sync,
{
    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(environment.default_log_filter()));

    let (json_layer, text_layer) = if environment.is_production() {
        (Some(fmt::layer().json().with_current_span(true)), None)
    } else {
        (None, Some(fmt::layer()))
    };

    subscriber
        .with(filter_layer)
        .with(json_layer)
        .with(text_layer)
        .init();

    info!(service.name = service_name, %environment, "tracing initialized");
}
