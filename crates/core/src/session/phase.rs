use std::time::Duration;

use crate::shared::stage::CaptureStage;

/// Lifecycle of the current stage's sub-cycle.
///
/// Recording overlaps `Countdown`: it starts when the countdown starts
/// and is finalized (or discarded) when the countdown ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Entry and reset state; becomes `Positioning` on the first tick.
    Idle,
    Positioning,
    /// Sustained-validity window, measured from the session clock.
    Countdown { started_at: Duration },
    /// Stop issued; waiting on the recorder's finalization event.
    Processing,
    Complete,
    Failed(FailureKind),
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Complete | Phase::Failed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    RecordingCapability,
    EmptyCapture,
    PhotoCapture,
    Packaging,
}

/// Read-only view of the session, rebuilt every tick and handed to
/// presentation collaborators. Nothing here feeds back into validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub stage: CaptureStage,
    pub stage_index: usize,
    pub stage_count: usize,
    pub phase: Phase,
    pub valid: bool,
    pub instruction: String,
    /// Countdown progress in [0, 100].
    pub progress_percent: f64,
    pub show_progress: bool,
    pub flash_visible: bool,
    pub show_restart: bool,
}
