//! Terminal per-item results handed to the outcome store.

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether the remote round-trip for an item succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    #[display("succeeded")]
    Succeeded,
    #[display("failed")]
    Failed,
}

/// Failure taxonomy folded into a failed outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Network failure or timeout
    #[display("transport")]
    Transport,
    /// Non-success status or undecodable body
    #[display("protocol")]
    Protocol,
    /// Response decoded but missing required structure
    #[display("validation")]
    Validation,
}

/// Reference to a renderable image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactRef {
    /// The unmodified submitted item
    Source { item_id: Uuid, file_name: String },
    /// An artifact hosted by the remote processor
    Remote { url: String },
}

impl ArtifactRef {
    pub fn is_source(&self) -> bool {
        matches!(self, Self::Source { .. })
    }
}

/// Display adjustments shown beside a processed image, in percent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorCorrection {
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeMetadata {
    pub total_labels: u32,
    pub has_errors: bool,
    pub enhancement_applied: bool,
    /// Mean label confidence reported by the remote analyser
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeError {
    pub category: ErrorCategory,
    pub message: String,
}

/// Terminal result of processing one submitted item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub id: String,
    pub item_id: Uuid,
    pub status: OutcomeStatus,
    pub title: String,
    pub description: String,
    pub categories: Vec<String>,
    pub original: ArtifactRef,
    pub processed: ArtifactRef,
    pub color_correction: ColorCorrection,
    pub metadata: OutcomeMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OutcomeError>,
    pub upload_date: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Succeeded
    }

    /// Error message for failed outcomes
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }

    /// Case-insensitive match over title, description and categories
    pub fn matches_search(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self
                .categories
                .iter()
                .any(|c| c.to_lowercase().contains(&needle))
    }
}
