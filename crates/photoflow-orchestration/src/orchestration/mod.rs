//! # Orchestration
//!
//! ```text
//! orchestration/
//! ├── stage_track.rs         # Per-item stage state machine
//! ├── item_pipeline.rs       # Stage simulation + remote call, reconciled per item
//! ├── outcome_builder.rs     # Success and fallback outcomes
//! ├── progress.rs            # Aggregated, monotonic batch progress
//! ├── submission_queue.rs    # Items waiting for the next run
//! ├── statistics.rs          # Per-batch counters
//! └── batch_orchestrator.rs  # Concurrent fan-out and batch persistence
//! ```

pub mod batch_orchestrator;
pub mod item_pipeline;
pub mod outcome_builder;
pub mod progress;
pub mod stage_track;
pub mod statistics;
pub mod submission_queue;

pub use batch_orchestrator::{BatchOrchestrator, BatchReport};
pub use item_pipeline::{ItemPipeline, PipelineEvent, PipelineResult, StageTimingConfig};
pub use progress::{BatchProgress, ProgressConfig, ProgressSnapshot};
pub use stage_track::{PipelineStage, StageEntry, StageStatus, StageTrack};
pub use statistics::BatchStatistics;
pub use submission_queue::SubmissionQueue;
