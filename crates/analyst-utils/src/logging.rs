//! Logging and tracing utilities

use crate::config::AppConfig;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing subscriber with default configuration
pub fn init_tracing() {
    init_tracing_with(&AppConfig::default());
}

/// Initialize tracing subscriber from an application configuration
///
/// `RUST_LOG` wins over `config.log_filter` when set. Output goes to stderr so
/// rendered views on stdout stay clean.
pub fn init_tracing_with(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let registry = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!(
        app = %config.app_name,
        environment = %config.environment,
        "tracing initialized"
    );
}
