//! # Stage Track
//!
//! Per-item record of the fixed visual pipeline. Pure state machine: the
//! owning pipeline drives every transition.
//!
//! ## Invariants
//!
//! - At most one stage is `Active`.
//! - Stages before the active one are `Completed`; stages after it are `Pending`.
//! - After `fail()` the failed stage is the only `Failed` one and the track
//!   no longer advances until `reset()`.

use derive_more::Display;
use serde::Serialize;

/// Named steps shown for every item, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    #[display("upload")]
    Upload,
    #[display("color_correction")]
    ColorCorrection,
    #[display("remote_analysis")]
    RemoteAnalysis,
    #[display("description_generation")]
    DescriptionGeneration,
    #[display("classification")]
    Classification,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 5] = [
        PipelineStage::Upload,
        PipelineStage::ColorCorrection,
        PipelineStage::RemoteAnalysis,
        PipelineStage::DescriptionGeneration,
        PipelineStage::Classification,
    ];

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            PipelineStage::Upload => "Upload",
            PipelineStage::ColorCorrection => "HDR Correction",
            PipelineStage::RemoteAnalysis => "Remote Analysis",
            PipelineStage::DescriptionGeneration => "AI Description",
            PipelineStage::Classification => "Classification",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PipelineStage::Upload => "Uploading image to the server",
            PipelineStage::ColorCorrection => "Applying color and HDR correction",
            PipelineStage::RemoteAnalysis => "Analyzing labels remotely",
            PipelineStage::DescriptionGeneration => "Generating an automatic description",
            PipelineStage::Classification => "Organizing by category",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    #[display("pending")]
    Pending,
    #[display("active")]
    Active,
    #[display("completed")]
    Completed,
    #[display("failed")]
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageEntry {
    pub stage: PipelineStage,
    pub status: StageStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageTrack {
    stages: Vec<StageEntry>,
    halted: bool,
}

impl StageTrack {
    /// All stages pending
    pub fn new() -> Self {
        Self {
            stages: PipelineStage::ALL
                .iter()
                .map(|&stage| StageEntry {
                    stage,
                    status: StageStatus::Pending,
                })
                .collect(),
            halted: false,
        }
    }

    pub fn stages(&self) -> &[StageEntry] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.stages
            .iter()
            .position(|entry| entry.status == StageStatus::Active)
    }

    pub fn active_stage(&self) -> Option<PipelineStage> {
        self.active_index().map(|idx| self.stages[idx].stage)
    }

    pub fn completed_count(&self) -> usize {
        self.stages
            .iter()
            .filter(|entry| entry.status == StageStatus::Completed)
            .count()
    }

    /// Share of stages completed, in [0, 1]
    pub fn fraction_complete(&self) -> f64 {
        if self.stages.is_empty() {
            return 1.0;
        }
        self.completed_count() as f64 / self.stages.len() as f64
    }

    /// Whether the track reached a terminal display state
    pub fn is_terminal(&self) -> bool {
        self.halted
    }

    pub fn has_failed(&self) -> bool {
        self.stages
            .iter()
            .any(|entry| entry.status == StageStatus::Failed)
    }

    /// Activate the first stage of a fresh track. Returns whether anything changed.
    pub fn begin(&mut self) -> bool {
        if self.halted || self.active_index().is_some() || self.completed_count() > 0 {
            return false;
        }
        match self.stages.first_mut() {
            Some(first) => {
                first.status = StageStatus::Active;
                true
            }
            None => false,
        }
    }

    /// Complete the active stage and activate the next one.
    ///
    /// No-op when halted, when nothing is active, or when the active stage is
    /// the last one. Returns whether anything changed.
    pub fn advance(&mut self) -> bool {
        if self.halted {
            return false;
        }
        let Some(idx) = self.active_index() else {
            return false;
        };
        if idx + 1 >= self.stages.len() {
            return false;
        }
        self.stages[idx].status = StageStatus::Completed;
        self.stages[idx + 1].status = StageStatus::Active;
        true
    }

    /// Mark the active stage failed and halt. Earlier completed stages stay
    /// completed. Returns the failed stage, if one was active.
    pub fn fail(&mut self) -> Option<PipelineStage> {
        if self.halted {
            return None;
        }
        let idx = self.active_index()?;
        self.stages[idx].status = StageStatus::Failed;
        self.halted = true;
        Some(self.stages[idx].stage)
    }

    /// Terminal success display: every stage completed
    pub fn complete_all(&mut self) {
        for entry in &mut self.stages {
            entry.status = StageStatus::Completed;
        }
        self.halted = true;
    }

    /// Back to all pending with nothing active
    pub fn reset(&mut self) {
        for entry in &mut self.stages {
            entry.status = StageStatus::Pending;
        }
        self.halted = false;
    }
}

impl Default for StageTrack {
    fn default() -> Self {
        Self::new()
    }
}
