//! # Batch Statistics
//!
//! Summary counters for one finished batch run.

use std::time::Duration;

use photoflow_shared::models::ItemOutcome;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchStatistics {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Wall-clock time from fan-out to persisted batch
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

impl BatchStatistics {
    pub fn from_outcomes(outcomes: &[ItemOutcome], elapsed: Duration) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            total: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            elapsed,
        }
    }

    /// Share of items that succeeded, in [0, 1]. An empty batch counts as fully successful.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.succeeded as f64 / self.total as f64
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::Serializer;

    pub(super) fn serialize<S: Serializer>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}
