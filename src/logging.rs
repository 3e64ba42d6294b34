use std::env;

use crate::config::AppConfig;

/// Initialise the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level; repeated calls are
/// harmless so tests can initialise freely.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("forecast_engine={}", config.log_level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);
    let filter = EnvFilter::try_new(filter_directive)
        .unwrap_or_else(|_| EnvFilter::new("forecast_engine=info"));

    if config.log_json {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialisation_is_harmless() {
        let config = AppConfig::default();
        init_tracing(&config);
        init_tracing(&config);
    }
}
