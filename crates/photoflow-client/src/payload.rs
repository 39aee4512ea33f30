//! Wire types for the remote processing endpoint.
//!
//! Requests carry the image base64-encoded in a JSON body. Responses arrive in
//! one of three envelopes, checked in order:
//!
//! ```text
//! { "response": { ...payload } }
//! { "body": "<payload as JSON string>" }   or   { "body": { ...payload } }
//! { ...payload }
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use photoflow_shared::models::SubmittedItem;

use crate::error::{ClientError, ClientResult};

/// JSON request body for one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    /// Base64 image content, without a data-URL prefix
    pub image: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
}

impl ProcessRequest {
    pub fn from_item(item: &SubmittedItem) -> Self {
        Self {
            image: STANDARD.encode(&item.content),
            file_name: item.file_name.clone(),
            file_type: item.content_type.clone(),
            file_size: item.size(),
        }
    }
}

/// One label reported by the remote analyser. Absent keys decode to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LabelDetail {
    pub name: String,
    pub confidence: Option<f64>,
    pub categories: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessingSummary {
    pub total_labels: u32,
    pub has_errors: bool,
    pub enhancement_applied: bool,
}

/// Result payload for one processed image. Every field is optional; callers
/// substitute display defaults for anything absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessedImagePayload {
    pub process_id: Option<String>,
    pub user_id: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub url: Option<String>,
    pub enhanced_file_name: Option<String>,
    pub enhanced_file_type: Option<String>,
    pub enhanced_url: Option<String>,
    pub labels: Option<Vec<String>>,
    pub labels_details: Option<Vec<LabelDetail>>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub processed_at: Option<String>,
    pub processing_summary: Option<ProcessingSummary>,
}

impl ProcessedImagePayload {
    /// Mean confidence across the `labels_details` entries that report one
    pub fn mean_confidence(&self) -> Option<f64> {
        let confidences: Vec<f64> = self
            .labels_details
            .iter()
            .flatten()
            .filter_map(|d| d.confidence)
            .collect();
        if confidences.is_empty() {
            return None;
        }
        Some(confidences.iter().sum::<f64>() / confidences.len() as f64)
    }
}

/// Decode a response body into a payload, unwrapping any envelope
pub fn decode_response(body: &[u8]) -> ClientResult<ProcessedImagePayload> {
    let value: Value = serde_json::from_slice(body)?;
    let payload = unwrap_envelope(value)?;

    if !payload.is_object() {
        return Err(ClientError::invalid_response(
            "payload",
            format!("expected a JSON object, got {}", value_kind(&payload)),
        ));
    }

    Ok(serde_json::from_value(payload)?)
}

fn unwrap_envelope(mut value: Value) -> ClientResult<Value> {
    if let Some(response) = take_present(&mut value, "response") {
        return Ok(response);
    }
    if let Some(body) = take_present(&mut value, "body") {
        return match body {
            Value::String(raw) => Ok(serde_json::from_str(&raw)?),
            other => Ok(other),
        };
    }
    Ok(value)
}

/// Remove `key` when it holds a value other than null, false, zero or ""
fn take_present(value: &mut Value, key: &str) -> Option<Value> {
    let object = value.as_object_mut()?;
    let present = match object.get(key)? {
        Value::Null | Value::Bool(false) => false,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    };
    if present {
        object.remove(key)
    } else {
        None
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
