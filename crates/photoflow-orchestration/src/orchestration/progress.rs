//! # Batch Progress
//!
//! One aggregated percentage for a whole batch run.
//!
//! While any item is in flight the value is the larger of two signals, held
//! under the in-flight cap:
//!
//! - a stage-derived floor, `mean(stage fraction) * cap`, raised as pipelines
//!   report stage advancement
//! - a ticker that adds a random increment up to `max_tick_increment` so the
//!   indicator never freezes
//!
//! The value never decreases. It reaches 100 only through [`BatchProgress::complete`],
//! which refuses while any item is unsettled.

use std::time::Duration;

use photoflow_shared::config::PhotoflowConfig;
use serde::Serialize;

/// Highest cap accepted while items are in flight
const MAX_IN_FLIGHT_CAP: f64 = 99.0;

pub const COMPLETE_PERCENT: f64 = 100.0;

/// Configuration for batch progress aggregation
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    pub tick_interval: Duration,
    pub max_tick_increment: f64,
    pub in_flight_cap: f64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self::from(&PhotoflowConfig::default())
    }
}

impl From<&PhotoflowConfig> for ProgressConfig {
    fn from(config: &PhotoflowConfig) -> Self {
        Self {
            tick_interval: Duration::from_millis(config.progress.tick_interval_ms),
            max_tick_increment: config.progress.max_tick_increment,
            in_flight_cap: config.progress.in_flight_cap,
        }
    }
}

/// Point-in-time view published to progress subscribers
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub percent: f64,
    pub settled: usize,
    pub total: usize,
}

impl ProgressSnapshot {
    pub fn idle() -> Self {
        Self {
            percent: 0.0,
            settled: 0,
            total: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.percent >= COMPLETE_PERCENT
    }
}

/// Aggregated progress for one batch run. Owned and mutated by the orchestrator only.
#[derive(Debug)]
pub struct BatchProgress {
    config: ProgressConfig,
    stage_fractions: Vec<f64>,
    settled: Vec<bool>,
    percent: f64,
    rng: fastrand::Rng,
}

impl BatchProgress {
    pub fn new(total: usize, config: ProgressConfig) -> Self {
        Self::with_rng(total, config, fastrand::Rng::new())
    }

    pub fn with_rng(total: usize, config: ProgressConfig, rng: fastrand::Rng) -> Self {
        Self {
            config,
            stage_fractions: vec![0.0; total],
            settled: vec![false; total],
            percent: 0.0,
            rng,
        }
    }

    pub fn total(&self) -> usize {
        self.settled.len()
    }

    pub fn settled_count(&self) -> usize {
        self.settled.iter().filter(|s| **s).count()
    }

    pub fn all_settled(&self) -> bool {
        self.settled.iter().all(|s| *s)
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    fn cap(&self) -> f64 {
        self.config.in_flight_cap.clamp(0.0, MAX_IN_FLIGHT_CAP)
    }

    /// Raise toward `target`, never past the cap and never downward
    fn raise(&mut self, target: f64) {
        let bounded = target.min(self.cap());
        if bounded > self.percent {
            self.percent = bounded;
        }
    }

    /// Smoothing tick. Ignored once the batch reached 100.
    pub fn tick(&mut self) -> f64 {
        if self.percent < COMPLETE_PERCENT {
            let increment = self.rng.f64() * self.config.max_tick_increment.max(0.0);
            self.raise(self.percent + increment);
        }
        self.percent
    }

    /// Record the stage fraction reported by pipeline `index`
    pub fn record_stage(&mut self, index: usize, fraction: f64) -> f64 {
        if let Some(slot) = self.stage_fractions.get_mut(index) {
            // A pipeline's own fraction never regresses either
            *slot = slot.max(fraction.clamp(0.0, 1.0));
        }
        if self.percent < COMPLETE_PERCENT && !self.stage_fractions.is_empty() {
            let mean = self.stage_fractions.iter().sum::<f64>() / self.stage_fractions.len() as f64;
            self.raise(mean * self.cap());
        }
        self.percent
    }

    pub fn record_settled(&mut self, index: usize) {
        if let Some(slot) = self.settled.get_mut(index) {
            *slot = true;
        }
    }

    /// Mark every item settled
    pub fn settle_all(&mut self) {
        self.settled.iter_mut().for_each(|s| *s = true);
    }

    /// Snap to 100. Returns false, leaving progress untouched, while any item is unsettled.
    pub fn complete(&mut self) -> bool {
        if !self.all_settled() {
            return false;
        }
        self.percent = COMPLETE_PERCENT;
        true
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            percent: self.percent,
            settled: self.settled_count(),
            total: self.total(),
        }
    }
}
