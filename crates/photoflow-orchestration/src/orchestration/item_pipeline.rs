//! # Item Pipeline
//!
//! Drives one submitted item to exactly one terminal [`ItemOutcome`].
//!
//! Two activities run concurrently inside the pipeline's own future:
//!
//! 1. **Stage simulation**: waits a jittered delay per stage and advances the
//!    item's [`StageTrack`] through all but the final stage. Display only.
//! 2. **Remote call**: invokes the [`RemoteProcessingClient`] exactly once.
//!
//! The remote settlement alone decides the outcome. Afterwards the track is
//! forced into the matching terminal state: all stages completed on success,
//! the in-flight stage failed on error. Errors never leave the pipeline.

use std::sync::Arc;
use std::time::Duration;

use photoflow_client::{ClientResult, ProcessedImagePayload, RemoteProcessingClient};
use photoflow_shared::config::PhotoflowConfig;
use photoflow_shared::models::{ItemOutcome, OutcomeStatus, SubmittedItem};
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

use super::outcome_builder::{failure_outcome, success_outcome};
use super::stage_track::{PipelineStage, StageTrack};

/// Cadence of the simulated stage sequence
#[derive(Debug, Clone)]
pub struct StageTimingConfig {
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Wait for the simulation to finish before reconciling; otherwise the
    /// remote settlement cuts it short
    pub await_simulation: bool,
}

impl Default for StageTimingConfig {
    fn default() -> Self {
        Self::from(&PhotoflowConfig::default())
    }
}

impl From<&PhotoflowConfig> for StageTimingConfig {
    fn from(config: &PhotoflowConfig) -> Self {
        Self {
            min_delay: Duration::from_millis(config.pipeline.stage_delay_min_ms),
            max_delay: Duration::from_millis(config.pipeline.stage_delay_max_ms),
            await_simulation: config.pipeline.await_stage_simulation,
        }
    }
}

impl StageTimingConfig {
    /// No stage delays; useful when only the remote call matters
    pub fn immediate() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            await_simulation: true,
        }
    }

    fn jittered_delay(&self, rng: &mut fastrand::Rng) -> Duration {
        let min = self.min_delay.as_millis() as u64;
        let max = (self.max_delay.as_millis() as u64).max(min);
        Duration::from_millis(rng.u64(min..=max))
    }
}

/// Reported by a pipeline to its orchestrator
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StageAdvanced {
        index: usize,
        stage: PipelineStage,
        fraction: f64,
    },
    Settled {
        index: usize,
        status: OutcomeStatus,
    },
}

/// Terminal result of one pipeline
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub index: usize,
    pub outcome: ItemOutcome,
    pub track: StageTrack,
}

#[derive(Debug)]
pub struct ItemPipeline {
    index: usize,
    item: SubmittedItem,
    client: Arc<dyn RemoteProcessingClient>,
    timing: StageTimingConfig,
    events: Option<mpsc::UnboundedSender<PipelineEvent>>,
}

impl ItemPipeline {
    pub fn new(
        index: usize,
        item: SubmittedItem,
        client: Arc<dyn RemoteProcessingClient>,
        timing: StageTimingConfig,
    ) -> Self {
        Self {
            index,
            item,
            client,
            timing,
            events: None,
        }
    }

    /// Report stage advancement and settlement on `events`
    pub fn with_events(mut self, events: mpsc::UnboundedSender<PipelineEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Run both activities to settlement and reconcile them into one outcome
    #[instrument(skip(self), fields(index = self.index, file_name = %self.item.file_name))]
    pub async fn run(self) -> PipelineResult {
        let mut rng = fastrand::Rng::new();
        let mut track = StageTrack::new();
        track.reset();
        track.begin();

        let settlement = self.settle(&mut track, rng.fork()).await;

        let outcome = match settlement {
            Ok(payload) => {
                track.complete_all();
                success_outcome(&self.item, payload, &mut rng)
            }
            Err(e) => {
                let failed_stage = track.fail();
                warn!(
                    error = %e,
                    category = %e.category(),
                    recoverable = e.is_recoverable(),
                    failed_stage = ?failed_stage,
                    "Remote processing failed, using fallback outcome"
                );
                failure_outcome(&self.item, &e)
            }
        };

        debug!(status = %outcome.status, outcome_id = %outcome.id, "Item pipeline settled");
        self.emit(PipelineEvent::Settled {
            index: self.index,
            status: outcome.status,
        });

        PipelineResult {
            index: self.index,
            outcome,
            track,
        }
    }

    async fn settle(
        &self,
        track: &mut StageTrack,
        rng: fastrand::Rng,
    ) -> ClientResult<ProcessedImagePayload> {
        let simulation = self.simulate_stages(track, rng);
        let remote = self.client.process(&self.item);

        if self.timing.await_simulation {
            let ((), settlement) = tokio::join!(simulation, remote);
            return settlement;
        }

        tokio::pin!(simulation);
        tokio::pin!(remote);
        tokio::select! {
            biased;
            settlement = &mut remote => settlement,
            () = &mut simulation => remote.await,
        }
    }

    /// Advance through every stage but the last on a jittered cadence
    async fn simulate_stages(&self, track: &mut StageTrack, mut rng: fastrand::Rng) {
        for _ in 1..track.len() {
            tokio::time::sleep(self.timing.jittered_delay(&mut rng)).await;
            if !track.advance() {
                break;
            }
            if let Some(stage) = track.active_stage() {
                debug!(
                    stage = %stage,
                    label = stage.label(),
                    detail = stage.description(),
                    "Stage advanced"
                );
                self.emit(PipelineEvent::StageAdvanced {
                    index: self.index,
                    stage,
                    fraction: track.fraction_complete(),
                });
            }
        }
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(events) = &self.events {
            // Orchestrator may have stopped listening
            let _ = events.send(event);
        }
    }
}

#[cfg(all(test, feature = "test-utils"))]
mod tests {
    use super::*;
    use crate::orchestration::stage_track::StageStatus;
    use crate::testing::{image_item, ScriptedClient, ScriptedFailure};

    fn timing(delay_ms: u64, await_simulation: bool) -> StageTimingConfig {
        StageTimingConfig {
            min_delay: Duration::from_millis(delay_ms),
            max_delay: Duration::from_millis(delay_ms),
            await_simulation,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_completes_every_stage() {
        let client = Arc::new(ScriptedClient::new());
        let item = image_item("river_bend.jpg");
        let (tx, mut rx) = mpsc::unbounded_channel();

        let result = ItemPipeline::new(0, item.clone(), client.clone(), timing(300, true))
            .with_events(tx)
            .run()
            .await;

        assert_eq!(result.outcome.status, OutcomeStatus::Succeeded);
        assert_eq!(result.outcome.item_id, item.id);
        assert!(result
            .track
            .stages()
            .iter()
            .all(|e| e.status == StageStatus::Completed));
        assert_eq!(client.call_count(), 1);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        let advanced = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::StageAdvanced { .. }))
            .count();
        assert_eq!(advanced, 4);
        assert_eq!(
            events.last(),
            Some(&PipelineEvent::Settled {
                index: 0,
                status: OutcomeStatus::Succeeded
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_marks_in_flight_stage() {
        let client =
            Arc::new(ScriptedClient::new().fail("broken.jpg", ScriptedFailure::Status(500)));

        let result = ItemPipeline::new(3, image_item("broken.jpg"), client, timing(300, true))
            .run()
            .await;

        assert_eq!(result.index, 3);
        assert_eq!(result.outcome.status, OutcomeStatus::Failed);
        assert!(result.outcome.error_message().is_some_and(|m| !m.is_empty()));
        assert_eq!(result.outcome.processed, result.outcome.original);

        let statuses: Vec<_> = result.track.stages().iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![
                StageStatus::Completed,
                StageStatus::Completed,
                StageStatus::Completed,
                StageStatus::Completed,
                StageStatus::Failed,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_settlement_cuts_simulation_short() {
        let client = Arc::new(
            ScriptedClient::new().fail("quick.jpg", ScriptedFailure::MalformedBody),
        );

        let result = ItemPipeline::new(0, image_item("quick.jpg"), client, timing(300, false))
            .run()
            .await;

        // Remote settled before the first stage delay elapsed
        assert_eq!(result.track.stages()[0].status, StageStatus::Failed);
        assert_eq!(result.track.completed_count(), 0);
        assert_eq!(
            result.outcome.error.map(|e| e.category),
            Some(photoflow_shared::models::ErrorCategory::Protocol)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_remote_outlasts_simulation() {
        let client = Arc::new(
            ScriptedClient::new().delay("slow.jpg", Duration::from_secs(10)),
        );

        let started = tokio::time::Instant::now();
        let result = ItemPipeline::new(0, image_item("slow.jpg"), client, timing(100, false))
            .run()
            .await;

        assert!(started.elapsed() >= Duration::from_secs(10));
        assert_eq!(result.outcome.status, OutcomeStatus::Succeeded);
        assert_eq!(result.track.fraction_complete(), 1.0);
    }

    #[test]
    fn test_timing_from_config() {
        let timing = StageTimingConfig::from(&PhotoflowConfig::default());
        assert_eq!(timing.min_delay, Duration::from_millis(300));
        assert_eq!(timing.max_delay, Duration::from_millis(800));
        assert!(timing.await_simulation);

        let mut rng = fastrand::Rng::with_seed(3);
        for _ in 0..50 {
            let delay = timing.jittered_delay(&mut rng);
            assert!(delay >= timing.min_delay && delay <= timing.max_delay);
        }
    }
}
