use thiserror::Error;

use crate::device::DeviceError;

/// Position in the per-frame state machine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameStage {
    Idle,
    Clear,
    ComputeModel,
    ComposeMvp,
    BindState,
    Draw,
    Submit,
}

/// Why a frame was abandoned.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("frame abandoned at {stage:?} (drawable {drawable:?}): {source}")]
pub struct FrameError {
    pub stage: FrameStage,
    /// Index of the drawable being processed, if any.
    pub drawable: Option<usize>,
    #[source]
    pub source: DeviceError,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Completed,
    Abandoned(FrameError),
    /// No surface session exists (not created yet, or setup failed).
    Skipped,
}

/// Result of one `on_frame` call.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Draw calls accepted by the device this frame.
    pub issued: usize,
    pub outcome: FrameOutcome,
}

impl FrameReport {
    pub(crate) fn skipped() -> Self {
        Self {
            issued: 0,
            outcome: FrameOutcome::Skipped,
        }
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.outcome == FrameOutcome::Completed
    }

    /// Returns `true` if the device can no longer render (host should exit).
    pub fn is_fatal(&self) -> bool {
        matches!(&self.outcome, FrameOutcome::Abandoned(e) if e.source.is_fatal())
    }

    pub fn error(&self) -> Option<&FrameError> {
        match &self.outcome {
            FrameOutcome::Abandoned(e) => Some(e),
            _ => None,
        }
    }
}
