//! # photoflow-client
//!
//! Remote processing for submitted items: the [`RemoteProcessingClient`]
//! trait the orchestrator depends on, its reqwest implementation, and the
//! request/response wire types.

pub mod error;
pub mod http;
pub mod payload;
pub mod remote;

pub use error::{ClientError, ClientResult};
pub use http::{HttpClientConfig, HttpProcessingClient};
pub use payload::{
    decode_response, LabelDetail, ProcessRequest, ProcessedImagePayload, ProcessingSummary,
};
pub use remote::RemoteProcessingClient;
