//! The seam between the orchestrator and whatever performs the real work.

use async_trait::async_trait;
use photoflow_shared::models::SubmittedItem;

use crate::error::ClientResult;
use crate::payload::ProcessedImagePayload;

/// Sends one item for remote processing.
///
/// Called exactly once per item per batch. Transport failures, non-success
/// statuses and undecodable bodies all surface as a [`crate::ClientError`].
#[async_trait]
pub trait RemoteProcessingClient: Send + Sync + std::fmt::Debug {
    async fn process(&self, item: &SubmittedItem) -> ClientResult<ProcessedImagePayload>;
}
