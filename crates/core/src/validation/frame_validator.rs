use crate::geometry::capture_region::CaptureRegion;
use crate::shared::config::CaptureConfig;
use crate::shared::detection::Detection;
use crate::validation::feedback::{Feedback, HorizontalHint, VerticalHint};

/// Outcome of evaluating one frame's detection against the region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub valid: bool,
    pub feedback: Feedback,
}

impl Verdict {
    fn invalid(feedback: Feedback) -> Self {
        Self {
            valid: false,
            feedback,
        }
    }
}

/// Pure per-frame validity evaluator.
///
/// Identical detection + region always yields the identical verdict;
/// all thresholds are fixed at construction.
pub struct FrameValidator {
    confidence_threshold: f64,
    max_offset_x: f64,
    max_offset_y: f64,
}

impl FrameValidator {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            confidence_threshold: config.confidence_threshold,
            max_offset_x: config.max_offset_x,
            max_offset_y: config.max_offset_y,
        }
    }

    /// Checks, in fixed precedence order: presence/confidence, fill
    /// range (inclusive bounds), then per-axis centering (inclusive at
    /// exactly the max offset).
    pub fn evaluate(&self, detection: Option<&Detection>, region: &CaptureRegion) -> Verdict {
        let Some(detection) = detection else {
            return Verdict::invalid(Feedback::NoFaceDetected);
        };
        if detection.confidence < self.confidence_threshold {
            return Verdict::invalid(Feedback::NoFaceDetected);
        }

        let area = detection.area();
        if area < region.min_area {
            return Verdict::invalid(Feedback::TooFar);
        }
        if area > region.max_area {
            return Verdict::invalid(Feedback::TooClose);
        }

        let (face_x, face_y) = detection.center();
        let target_y = region.target_center_y();

        let horizontal = if face_x < region.center_x - self.max_offset_x {
            Some(HorizontalHint::MoveRight)
        } else if face_x > region.center_x + self.max_offset_x {
            Some(HorizontalHint::MoveLeft)
        } else {
            None
        };
        let vertical = if face_y < target_y - self.max_offset_y {
            Some(VerticalHint::MoveDown)
        } else if face_y > target_y + self.max_offset_y {
            Some(VerticalHint::MoveUp)
        } else {
            None
        };

        if horizontal.is_some() || vertical.is_some() {
            return Verdict::invalid(Feedback::Adjust {
                horizontal,
                vertical,
            });
        }

        Verdict {
            valid: true,
            feedback: Feedback::HoldStill,
        }
    }
}
