use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use super::outputs::OutputKind;

/// One sub-operation of a processing run, in pipeline order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    CutSilence,
    EnhanceAudio,
    Thumbnail,
    Subtitles,
    Summarize,
    PixelEnhance,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::CutSilence => "cut_silence",
            StepKind::EnhanceAudio => "enhance_audio",
            StepKind::Thumbnail => "thumbnail",
            StepKind::Subtitles => "subtitles",
            StepKind::Summarize => "summarize",
            StepKind::PixelEnhance => "pixel_enhance",
        }
    }

    /// Fixed execution order of the pipeline.
    pub const ORDER: [StepKind; 6] = [
        StepKind::CutSilence,
        StepKind::EnhanceAudio,
        StepKind::Thumbnail,
        StepKind::Subtitles,
        StepKind::Summarize,
        StepKind::PixelEnhance,
    ];
}

impl Display for StepKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Outcome of one step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase", tag = "status")]
pub enum StepStatus {
    /// Step ran and produced the listed artifacts.
    Succeeded { outputs: Vec<OutputKind> },
    /// Step ran and failed with the captured reason.
    Failed { reason: String },
    /// Step could not run (capability missing) or was cancelled by an
    /// earlier fatal failure.
    Skipped { reason: String },
}

/// Per-step result aggregated by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepReport {
    pub step: StepKind,
    #[serde(flatten)]
    pub status: StepStatus,
}

impl StepReport {
    pub fn succeeded(step: StepKind, outputs: Vec<OutputKind>) -> Self {
        Self {
            step,
            status: StepStatus::Succeeded { outputs },
        }
    }

    pub fn failed(step: StepKind, reason: impl Into<String>) -> Self {
        Self {
            step,
            status: StepStatus::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn skipped(step: StepKind, reason: impl Into<String>) -> Self {
        Self {
            step,
            status: StepStatus::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, StepStatus::Failed { .. })
    }
}

/// The aggregated result of one `process_video` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingReport {
    pub steps: Vec<StepReport>,
}

impl ProcessingReport {
    pub fn push(&mut self, report: StepReport) {
        self.steps.push(report);
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| s.is_failure())
    }
}
