//! Tracing subscriber setup

use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    config::{Config, LogFormat},
    error::{Error, Result},
};

/// Build the filter from `service.log_level`, falling back to `info` when the
/// directive does not parse
fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|e| {
        eprintln!(
            "Invalid log level {:?} ({}), using \"info\"",
            config.service.log_level, e
        );
        EnvFilter::new("info")
    })
}

/// Initialize the global tracing subscriber
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &Config) -> Result<()> {
    let builder = fmt().with_env_filter(env_filter(config));

    let installed = match config.service.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    installed.map_err(|e| Error::Internal(format!("Failed to initialize tracing: {}", e)))?;

    tracing::info!(
        environment = %config.service.environment,
        "Tracing initialized for service: {}",
        config.service.name
    );

    Ok(())
}
