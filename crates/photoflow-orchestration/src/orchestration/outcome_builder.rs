//! Terminal outcome construction for settled items.
//!
//! Success outcomes fill every absent payload field with a display default
//! instead of failing. Failure outcomes echo the original item as their
//! processed artifact so there is always something renderable.

use chrono::{DateTime, NaiveDateTime, Utc};
use photoflow_client::{ClientError, ProcessedImagePayload};
use photoflow_shared::models::{
    file_stem, ArtifactRef, ColorCorrection, ItemOutcome, OutcomeError, OutcomeMetadata,
    OutcomeStatus, SubmittedItem,
};
use uuid::Uuid;

pub const DEFAULT_DESCRIPTION: &str = "Image processed with AI";
pub const DEFAULT_CATEGORIES: [&str; 2] = ["landscape", "nature"];
pub const FALLBACK_CATEGORIES: [&str; 2] = ["error", "unprocessed"];

/// Build the outcome for an item whose remote call succeeded
pub fn success_outcome(
    item: &SubmittedItem,
    payload: ProcessedImagePayload,
    rng: &mut fastrand::Rng,
) -> ItemOutcome {
    let now = Utc::now();
    let original = source_artifact(item);
    let confidence = payload.mean_confidence();

    let processed = non_empty(payload.enhanced_url)
        .or_else(|| non_empty(payload.url))
        .map(|url| ArtifactRef::Remote { url })
        .unwrap_or_else(|| original.clone());

    let title = display_title(
        non_empty(payload.file_name)
            .as_deref()
            .unwrap_or(&item.file_name),
    );

    let upload_date = [payload.created_at.as_deref(), payload.processed_at.as_deref()]
        .into_iter()
        .flatten()
        .find_map(parse_timestamp)
        .unwrap_or(now);

    let summary = payload.processing_summary.unwrap_or_default();

    ItemOutcome {
        id: non_empty(payload.process_id).unwrap_or_else(generated_id),
        item_id: item.id,
        status: OutcomeStatus::Succeeded,
        title,
        description: non_empty(payload.description)
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        categories: payload
            .labels
            .unwrap_or_else(|| to_strings(&DEFAULT_CATEGORIES)),
        original,
        processed,
        color_correction: random_color_correction(rng),
        metadata: OutcomeMetadata {
            total_labels: summary.total_labels,
            has_errors: summary.has_errors,
            enhancement_applied: summary.enhancement_applied,
            confidence,
        },
        error: None,
        upload_date,
        recorded_at: now,
    }
}

/// Build the fallback outcome for an item whose remote call failed
pub fn failure_outcome(item: &SubmittedItem, error: &ClientError) -> ItemOutcome {
    let now = Utc::now();
    let original = source_artifact(item);
    let message = error.to_string();

    ItemOutcome {
        id: generated_id(),
        item_id: item.id,
        status: OutcomeStatus::Failed,
        title: format!("{} - processing error", item.stem()),
        description: format!("Failed to process image: {message}"),
        categories: to_strings(&FALLBACK_CATEGORIES),
        processed: original.clone(),
        original,
        color_correction: ColorCorrection::default(),
        metadata: OutcomeMetadata {
            has_errors: true,
            ..OutcomeMetadata::default()
        },
        error: Some(OutcomeError {
            category: error.category(),
            message,
        }),
        upload_date: now,
        recorded_at: now,
    }
}

/// Accepts RFC 3339 timestamps and offset-less ones, which are read as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

fn source_artifact(item: &SubmittedItem) -> ArtifactRef {
    ArtifactRef::Source {
        item_id: item.id,
        file_name: item.file_name.clone(),
    }
}

fn display_title(file_name: &str) -> String {
    file_stem(file_name).replace('_', " ")
}

fn random_color_correction(rng: &mut fastrand::Rng) -> ColorCorrection {
    ColorCorrection {
        brightness: rng.f64() * 20.0 - 10.0,
        contrast: rng.f64() * 30.0 + 5.0,
        saturation: rng.f64() * 35.0 + 10.0,
    }
}

fn generated_id() -> String {
    format!("img-{}", Uuid::now_v7())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}
