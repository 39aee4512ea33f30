//! Test doubles for the orchestrator's collaborators.
//!
//! [`ScriptedClient`] answers per file name with a scripted delay, payload or
//! failure, and records call order and peak concurrency. [`RecordingSink`]
//! keeps every batch it receives.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use photoflow_client::payload::ProcessingSummary;
use photoflow_client::{
    decode_response, ClientError, ClientResult, ProcessedImagePayload, RemoteProcessingClient,
};
use photoflow_shared::models::{media_type_for, ItemOutcome, SubmittedItem};
use photoflow_shared::store::ResultSink;

/// Build a small in-memory image item
pub fn image_item(file_name: &str) -> SubmittedItem {
    SubmittedItem::builder()
        .file_name(file_name)
        .content_type(media_type_for(file_name).unwrap_or("image/jpeg"))
        .content(file_name.as_bytes().to_vec())
        .build()
}

/// How a scripted remote call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedFailure {
    /// Non-success HTTP status
    Status(u16),
    Timeout,
    /// Body that is not JSON
    MalformedBody,
    /// JSON that is not an object
    InvalidPayload,
}

impl ScriptedFailure {
    fn into_error(self, file_name: &str) -> ClientError {
        match self {
            ScriptedFailure::Status(status) => {
                ClientError::api_error(status, format!("scripted failure for {file_name}"))
            }
            ScriptedFailure::Timeout => ClientError::Timeout {
                operation: format!("process {file_name}"),
            },
            ScriptedFailure::MalformedBody => decode_response(b"<html>Bad Gateway</html>")
                .err()
                .unwrap_or_else(|| ClientError::invalid_response("body", "not JSON")),
            ScriptedFailure::InvalidPayload => decode_response(b"[]")
                .err()
                .unwrap_or_else(|| ClientError::invalid_response("payload", "not an object")),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Script {
    delay: Option<Duration>,
    failure: Option<ScriptedFailure>,
    payload: Option<ProcessedImagePayload>,
}

/// Remote client answering from a per-file-name script
#[derive(Debug, Default)]
pub struct ScriptedClient {
    scripts: HashMap<String, Script>,
    default_delay: Duration,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay applied to items without their own script delay
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn delay(mut self, file_name: &str, delay: Duration) -> Self {
        self.script(file_name).delay = Some(delay);
        self
    }

    pub fn fail(mut self, file_name: &str, failure: ScriptedFailure) -> Self {
        self.script(file_name).failure = Some(failure);
        self
    }

    pub fn respond(mut self, file_name: &str, payload: ProcessedImagePayload) -> Self {
        self.script(file_name).payload = Some(payload);
        self
    }

    fn script(&mut self, file_name: &str) -> &mut Script {
        self.scripts.entry(file_name.to_string()).or_default()
    }

    /// File names in the order `process` was called
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    /// Highest number of calls awaiting settlement at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

/// Default success payload for scripted items
pub fn scripted_payload(file_name: &str) -> ProcessedImagePayload {
    ProcessedImagePayload {
        process_id: Some(format!("proc-{file_name}")),
        file_name: Some(file_name.to_string()),
        url: Some(format!("https://cdn.example.test/original/{file_name}")),
        enhanced_url: Some(format!("https://cdn.example.test/enhanced/{file_name}")),
        labels: Some(vec!["scripted".to_string()]),
        processing_summary: Some(ProcessingSummary {
            total_labels: 1,
            has_errors: false,
            enhancement_applied: true,
        }),
        ..ProcessedImagePayload::default()
    }
}

#[async_trait]
impl RemoteProcessingClient for ScriptedClient {
    async fn process(&self, item: &SubmittedItem) -> ClientResult<ProcessedImagePayload> {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(item.file_name.clone());

        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        let script = self.scripts.get(&item.file_name).cloned().unwrap_or_default();
        let delay = script.delay.unwrap_or(self.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match script.failure {
            Some(failure) => Err(failure.into_error(&item.file_name)),
            None => Ok(script
                .payload
                .unwrap_or_else(|| scripted_payload(&item.file_name))),
        }
    }
}

/// Sink that keeps every batch it is handed
#[derive(Debug, Default)]
pub struct RecordingSink {
    batches: Mutex<Vec<Vec<ItemOutcome>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> Vec<Vec<ItemOutcome>> {
        self.batches.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

#[async_trait]
impl ResultSink for RecordingSink {
    async fn append_batch(&self, outcomes: Vec<ItemOutcome>) {
        self.batches
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(outcomes);
    }
}
