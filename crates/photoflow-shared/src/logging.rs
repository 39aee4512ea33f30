//! # Logging
//!
//! Tracing subscriber setup shared by photoflow binaries. `RUST_LOG` wins over
//! the configured filter when set.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingSettings};
use crate::errors::{PhotoflowError, PhotoflowResult};

/// Install the global tracing subscriber, writing to stderr.
///
/// Returns an error if the filter directive is invalid or a subscriber is
/// already installed.
pub fn init_tracing(settings: &LoggingSettings) -> PhotoflowResult<()> {
    let filter = build_filter(settings)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match settings.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| PhotoflowError::configuration(format!("tracing init failed: {e}")))
}

fn build_filter(settings: &LoggingSettings) -> PhotoflowResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&settings.filter).map_err(|e| {
        PhotoflowError::configuration(format!("invalid log filter '{}': {e}", settings.filter))
    })
}
