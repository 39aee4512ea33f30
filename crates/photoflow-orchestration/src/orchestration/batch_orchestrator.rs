//! # Batch Orchestrator
//!
//! Fans out one [`ItemPipeline`] per submitted item, runs them all
//! concurrently, and resolves once every pipeline has settled.
//!
//! ## Flow
//!
//! ```text
//! items ──► ItemPipeline × N ──join_all──► outcomes (submission order)
//!                 │                                   │
//!                 └── PipelineEvent ──► BatchProgress ├──► ResultSink (one write)
//!                       ticker ──────────┘            └──► progress = 100
//! ```
//!
//! Pipelines are polled on the caller's task; nothing is spawned. Progress is
//! owned by the orchestrator loop and published through a `watch` channel.
//! A batch run has no failure state: every item ends `Succeeded` or
//! `Failed` with a fallback outcome.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use photoflow_client::RemoteProcessingClient;
use photoflow_shared::config::PhotoflowConfig;
use photoflow_shared::models::{ItemOutcome, SubmittedItem};
use photoflow_shared::store::ResultSink;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::item_pipeline::{ItemPipeline, PipelineEvent, StageTimingConfig};
use super::progress::{BatchProgress, ProgressConfig, ProgressSnapshot};
use super::stage_track::StageTrack;
use super::statistics::BatchStatistics;
use super::submission_queue::SubmissionQueue;

/// `interval` rejects a zero period
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Everything a finished batch run produced
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    /// One outcome per submitted item, in submission order
    pub outcomes: Vec<ItemOutcome>,
    /// Terminal stage display per item, in submission order
    #[serde(skip)]
    pub tracks: Vec<StageTrack>,
    pub final_progress: ProgressSnapshot,
    pub statistics: BatchStatistics,
}

#[derive(Debug)]
pub struct BatchOrchestrator {
    client: Arc<dyn RemoteProcessingClient>,
    sink: Arc<dyn ResultSink>,
    timing: StageTimingConfig,
    progress_config: ProgressConfig,
    queue: SubmissionQueue,
    progress_tx: watch::Sender<ProgressSnapshot>,
}

impl BatchOrchestrator {
    pub fn new(client: Arc<dyn RemoteProcessingClient>, sink: Arc<dyn ResultSink>) -> Self {
        Self::with_config(client, sink, &PhotoflowConfig::default())
    }

    pub fn with_config(
        client: Arc<dyn RemoteProcessingClient>,
        sink: Arc<dyn ResultSink>,
        config: &PhotoflowConfig,
    ) -> Self {
        let (progress_tx, _) = watch::channel(ProgressSnapshot::idle());
        Self {
            client,
            sink,
            timing: StageTimingConfig::from(config),
            progress_config: ProgressConfig::from(config),
            queue: SubmissionQueue::new(),
            progress_tx,
        }
    }

    pub fn with_stage_timing(mut self, timing: StageTimingConfig) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_progress_config(mut self, config: ProgressConfig) -> Self {
        self.progress_config = config;
        self
    }

    /// Observe batch progress. The latest snapshot is always available via `borrow()`.
    pub fn subscribe_progress(&self) -> watch::Receiver<ProgressSnapshot> {
        self.progress_tx.subscribe()
    }

    pub fn progress(&self) -> ProgressSnapshot {
        *self.progress_tx.borrow()
    }

    pub fn submit(&mut self, item: SubmittedItem) {
        self.queue.submit(item);
    }

    pub fn submit_all(&mut self, items: impl IntoIterator<Item = SubmittedItem>) {
        self.queue.submit_all(items);
    }

    pub fn queue(&self) -> &SubmissionQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut SubmissionQueue {
        &mut self.queue
    }

    /// Process everything queued, then clear the queue once the batch is persisted
    pub async fn run_queued(&mut self) -> BatchReport {
        let items = self.queue.items().to_vec();
        let report = self.process_batch(items).await;
        self.queue.clear();
        report
    }

    /// Run one pipeline per item concurrently and persist the outcomes as one batch
    #[instrument(skip(self, items), fields(item_count = items.len()))]
    pub async fn process_batch(&self, items: Vec<SubmittedItem>) -> BatchReport {
        let batch_id = Uuid::now_v7();
        let started = Instant::now();
        let mut progress = BatchProgress::new(items.len(), self.progress_config.clone());
        self.publish(&progress);

        if items.is_empty() {
            progress.complete();
            self.publish(&progress);
            info!(%batch_id, "Empty batch, nothing to process");
            return BatchReport {
                batch_id,
                outcomes: Vec::new(),
                tracks: Vec::new(),
                final_progress: progress.snapshot(),
                statistics: BatchStatistics::from_outcomes(&[], started.elapsed()),
            };
        }

        info!(%batch_id, items = items.len(), "Starting batch");

        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let pipelines = items.into_iter().enumerate().map(|(index, item)| {
            ItemPipeline::new(index, item, Arc::clone(&self.client), self.timing.clone())
                .with_events(event_tx.clone())
                .run()
        });
        let all_settled = join_all(pipelines);
        drop(event_tx);
        tokio::pin!(all_settled);

        let period = self.progress_config.tick_interval.max(MIN_TICK_INTERVAL);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let results = loop {
            tokio::select! {
                results = &mut all_settled => break results,
                Some(event) = event_rx.recv() => {
                    self.apply_event(&mut progress, event);
                }
                _ = ticker.tick() => {
                    progress.tick();
                    self.publish(&progress);
                }
            }
        };

        while let Ok(event) = event_rx.try_recv() {
            self.apply_event(&mut progress, event);
        }
        progress.settle_all();

        let (outcomes, tracks): (Vec<_>, Vec<_>) = results
            .into_iter()
            .map(|result| (result.outcome, result.track))
            .unzip();

        let statistics = BatchStatistics::from_outcomes(&outcomes, started.elapsed());
        if statistics.has_failures() {
            warn!(
                %batch_id,
                failed = statistics.failed,
                total = statistics.total,
                "Batch finished with failed items"
            );
        }

        self.sink.append_batch(outcomes.clone()).await;

        progress.complete();
        self.publish(&progress);

        info!(
            %batch_id,
            succeeded = statistics.succeeded,
            failed = statistics.failed,
            elapsed_ms = statistics.elapsed.as_millis() as u64,
            "Batch complete"
        );

        BatchReport {
            batch_id,
            outcomes,
            tracks,
            final_progress: progress.snapshot(),
            statistics,
        }
    }

    fn apply_event(&self, progress: &mut BatchProgress, event: PipelineEvent) {
        match event {
            PipelineEvent::StageAdvanced {
                index,
                stage,
                fraction,
            } => {
                debug!(index, stage = %stage, fraction, "Pipeline stage advanced");
                progress.record_stage(index, fraction);
            }
            PipelineEvent::Settled { index, status } => {
                debug!(index, status = %status, "Pipeline settled");
                progress.record_settled(index);
            }
        }
        self.publish(progress);
    }

    fn publish(&self, progress: &BatchProgress) {
        self.progress_tx.send_replace(progress.snapshot());
    }
}
