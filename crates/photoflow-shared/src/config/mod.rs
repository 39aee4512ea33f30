//! # Photoflow Configuration
//!
//! Configuration types for the photoflow batch processing stack.
//!
//! ## Structure
//!
//! ```text
//! config/
//! ├── mod.rs      # PhotoflowConfig and its sections
//! └── loader.rs   # ConfigManager: defaults → TOML file → environment
//! ```
//!
//! ## Example
//!
//! ```toml
//! [remote]
//! endpoint = "https://images.example.com/process"
//! timeout_seconds = 20
//!
//! [pipeline]
//! stage_delay_min_ms = 300
//! stage_delay_max_ms = 800
//!
//! [progress]
//! tick_interval_ms = 500
//! in_flight_cap = 85.0
//!
//! [store]
//! history_path = "./photoflow-history.json"
//! ```
//!
//! Any key can be overridden from the environment with the `PHOTOFLOW` prefix
//! and `__` as the section separator, e.g. `PHOTOFLOW__REMOTE__TIMEOUT_SECONDS=5`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub mod loader;
pub use loader::ConfigManager;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct PhotoflowConfig {
    #[serde(default)]
    #[validate(nested)]
    pub remote: RemoteSettings,
    #[serde(default)]
    #[validate(nested)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    #[validate(nested)]
    pub progress: ProgressSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Remote processing endpoint settings
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct RemoteSettings {
    #[validate(url)]
    pub endpoint: String,
    #[validate(range(min = 1, max = 600))]
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000/api/process-image".to_string(),
            timeout_seconds: 30,
            user_agent: concat!("photoflow/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Per-item stage simulation cadence
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_stage_delays"))]
pub struct PipelineSettings {
    #[validate(range(min = 1, max = 60_000))]
    pub stage_delay_min_ms: u64,
    #[validate(range(min = 1, max = 60_000))]
    pub stage_delay_max_ms: u64,
    /// Wait for the simulated stage sequence before reconciling an item
    pub await_stage_simulation: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            stage_delay_min_ms: 300,
            stage_delay_max_ms: 800,
            await_stage_simulation: true,
        }
    }
}

fn validate_stage_delays(settings: &PipelineSettings) -> Result<(), ValidationError> {
    if settings.stage_delay_min_ms > settings.stage_delay_max_ms {
        let mut err = ValidationError::new("stage_delay_order");
        err.message = Some("stage_delay_min_ms must not exceed stage_delay_max_ms".into());
        return Err(err);
    }
    Ok(())
}

/// Aggregated batch progress behavior
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct ProgressSettings {
    #[validate(range(min = 10, max = 10_000))]
    pub tick_interval_ms: u64,
    #[validate(range(min = 0.0, max = 50.0))]
    pub max_tick_increment: f64,
    /// Ceiling held while any item is still in flight
    #[validate(range(min = 0.0, max = 99.0))]
    pub in_flight_cap: f64,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 500,
            max_tick_increment: 2.0,
            in_flight_cap: 85.0,
        }
    }
}

/// Outcome history persistence
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreSettings {
    /// JSON file holding the outcome history; memory only when absent
    #[serde(default)]
    pub history_path: Option<PathBuf>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Tracing subscriber settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}
