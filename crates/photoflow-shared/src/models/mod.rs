//! Domain models shared by the client and orchestration crates.

pub mod item;
pub mod outcome;

pub use item::{file_stem, media_type_for, SubmittedItem};
pub use outcome::{
    ArtifactRef, ColorCorrection, ErrorCategory, ItemOutcome, OutcomeError, OutcomeMetadata,
    OutcomeStatus,
};
