//! Tracing setup shared by the service binary and ad-hoc tooling.

use crate::config::{AppEnvironment, TelemetryConfig};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{value}'")]
    Filter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("tracing subscriber already installed: {0}")]
    Install(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Resolve the event filter. An explicit `RUST_LOG` wins over the configured
/// level so operators can override a deployed service without editing config.
pub fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.log_level).map_err(|source| TelemetryError::Filter {
        value: config.log_level.clone(),
        source,
    })
}

/// Install the global subscriber. Development keeps event targets for
/// source navigation; test and production emit compact targetless lines
/// without ANSI escapes so log collectors ingest them as plain text.
pub fn init(config: &TelemetryConfig, environment: AppEnvironment) -> Result<(), TelemetryError> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false);

    match environment {
        AppEnvironment::Development => builder.with_target(true).try_init(),
        AppEnvironment::Test | AppEnvironment::Production => {
            builder.compact().with_target(false).try_init()
        }
    }
    .map_err(TelemetryError::Install)
}
