use thiserror::Error;

use crate::camera::domain::camera_source::AcquisitionError;
use crate::packaging::packager::PackagingError;
use crate::recording::domain::recorder_backend::RecordingError;
use crate::shared::stage::CaptureStage;

/// Structural session failures. Transient per-frame conditions (a
/// missed detection, a low-confidence box) never become errors; every
/// variant here is terminal for the session and requires a restart.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),
    #[error(transparent)]
    Recording(#[from] RecordingError),
    #[error("recording produced no data during the {stage} stage")]
    EmptyCapture { stage: CaptureStage },
    #[error(transparent)]
    Packaging(#[from] PackagingError),
    #[error("session made no progress within {ticks} ticks")]
    Stalled { ticks: u64 },
}
