use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::{LogFormat, LoggingConfig};

/// Filter from `RUST_LOG` when set, otherwise from the configured level.
///
/// # Errors
/// Returns an error if the configured level is not a valid filter directive.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .with_context(|| format!("invalid log level directive '{}'", config.level))
}

/// Install the global subscriber writing to stderr and bridge `log` records
/// into it.
///
/// # Errors
/// Returns an error if the filter is invalid or a global subscriber or log
/// bridge is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let output = match config.format {
        LogFormat::Text => fmt::layer().with_writer(std::io::stderr).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    };
    let subscriber = tracing_subscriber::registry().with(filter).with(output);

    tracing::subscriber::set_global_default(subscriber)
        .context("a global tracing subscriber is already installed")?;
    tracing_log::LogTracer::init().context("a log bridge is already installed")?;

    tracing::debug!(level = %config.level, format = ?config.format, "Logging initialized");
    Ok(())
}
