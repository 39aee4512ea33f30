//! # photoflow-core
//!
//! Facade over the photoflow crates:
//!
//! - [`shared`]: configuration, logging, domain models and the outcome store
//! - [`client`]: the remote processing client and its wire types
//! - [`orchestration`]: per-item pipelines and the batch orchestrator

pub use photoflow_client as client;
pub use photoflow_orchestration as orchestration;
pub use photoflow_shared as shared;

pub use photoflow_client::{HttpClientConfig, HttpProcessingClient, RemoteProcessingClient};
pub use photoflow_orchestration::{BatchOrchestrator, BatchReport, ProgressSnapshot};
pub use photoflow_shared::config::{ConfigManager, PhotoflowConfig};
pub use photoflow_shared::models::{ItemOutcome, OutcomeStatus, SubmittedItem};
pub use photoflow_shared::store::{OutcomeStore, ResultSink, StoreEvent};
pub use photoflow_shared::{PhotoflowError, PhotoflowResult};
