//! # Outcome Storage
//!
//! The orchestrator hands each finished batch to a [`ResultSink`]. The
//! provided implementation, [`OutcomeStore`], keeps the ordered outcome
//! history (newest batch first), optionally mirrors it to a JSON file, and
//! broadcasts a [`StoreEvent`] on every change.

use async_trait::async_trait;

use crate::models::ItemOutcome;

pub mod outcome_store;
pub use outcome_store::OutcomeStore;

/// Destination for completed batches.
///
/// Implementations must not fail the caller: persistence problems are
/// handled (logged) inside the sink.
#[async_trait]
pub trait ResultSink: Send + Sync + std::fmt::Debug {
    /// Persist one batch of outcomes, in submission order
    async fn append_batch(&self, outcomes: Vec<ItemOutcome>);
}

/// Change notifications published by [`OutcomeStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    BatchAppended { count: usize },
    Removed { id: String },
    Cleared,
}
