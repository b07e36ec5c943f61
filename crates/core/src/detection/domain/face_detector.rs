use crate::shared::detection::Detection;
use crate::shared::frame::Frame;

/// Domain interface for face detection.
///
/// Implementations may be stateful (e.g., tracking across frames),
/// hence `&mut self`. May block while inference runs; the session loop
/// does not issue a new frame until `detect` returns. Errors are
/// absorbed by the caller as "no detection this frame".
pub trait FaceDetector: Send {
    fn detect(
        &mut self,
        frame: &Frame,
        timestamp_ms: u64,
    ) -> Result<Vec<Detection>, Box<dyn std::error::Error>>;
}
