//! Tracing subscriber setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::{
    config::{LogFormat, LoggerSettings},
    Error, Result,
};

const MODULE_WHITELIST: &[&str] = &["normal_form"];

/// Builds the filter directive for the configured settings.
///
/// `override_filter` wins over the level; otherwise only this crate logs at
/// the configured level.
#[must_use]
pub fn filter_directive(settings: &LoggerSettings) -> String {
    settings.override_filter.clone().unwrap_or_else(|| {
        MODULE_WHITELIST
            .iter()
            .map(|module| format!("{module}={}", settings.level.as_str()))
            .collect::<Vec<_>>()
            .join(",")
    })
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over the
/// configuration. Returns `Ok(false)` when logging is disabled.
pub fn init(settings: &LoggerSettings) -> Result<bool> {
    if !settings.enable {
        return Ok(false);
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(settings)))
        .map_err(|err| Error::Logger(err.to_string()))?;

    let layer = match settings.format {
        LogFormat::Compact => fmt::layer().compact().boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Json => fmt::layer().json().boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .map_err(|err| Error::Logger(err.to_string()))?;
    Ok(true)
}
