//! # photoflow-shared
//!
//! Components shared across the photoflow crates:
//!
//! - [`config`]: layered configuration (`config` + `validator`)
//! - [`errors`]: the shared error type
//! - [`logging`]: tracing subscriber setup
//! - [`models`]: submitted items and their terminal outcomes
//! - [`store`]: the outcome history and the `ResultSink` seam

pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod store;

pub use errors::{PhotoflowError, PhotoflowResult};
