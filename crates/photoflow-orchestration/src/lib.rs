//! # photoflow-orchestration
//!
//! Runs a batch of submitted images through concurrent per-item pipelines,
//! aggregates one progress value for the batch, and hands the ordered
//! outcomes to a [`ResultSink`](photoflow_shared::store::ResultSink).
//!
//! ```rust,ignore
//! let client = Arc::new(HttpProcessingClient::new(HttpClientConfig::from(&config))?);
//! let store = Arc::new(OutcomeStore::in_memory());
//! let mut orchestrator = BatchOrchestrator::with_config(client, store, &config);
//!
//! orchestrator.submit(SubmittedItem::from_path("fjord.jpg").await?);
//! let report = orchestrator.run_queued().await;
//! ```

pub mod orchestration;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use orchestration::{
    BatchOrchestrator, BatchReport, BatchStatistics, PipelineStage, ProgressConfig,
    ProgressSnapshot, StageStatus, StageTimingConfig, StageTrack, SubmissionQueue,
};
