use thiserror::Error;

use crate::shared::frame::Frame;

/// Preferred capture geometry. Sources may return frames of a different
/// size; callers must read the actual dimensions off each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 1280,
            ideal_height: 720,
        }
    }
}

/// Camera access failed outright. Fatal to the session: there is no
/// retry loop at this level.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("camera unavailable: {0}")]
    Unavailable(String),
    #[error("camera access denied: {0}")]
    AccessDenied(String),
}

/// A live stream of frames from an acquired camera.
pub trait FrameSource: Send {
    /// Returns the most recent frame. Mid-session failures are fatal.
    fn current_frame(&mut self) -> Result<Frame, AcquisitionError>;

    /// Releases the underlying device. Idempotent.
    fn release(&mut self);
}

/// Domain interface for opening a camera.
pub trait CameraSource: Send {
    fn acquire(
        &mut self,
        constraints: &CameraConstraints,
    ) -> Result<Box<dyn FrameSource>, AcquisitionError>;
}
