/// Horizontal correction hint, in mirrored-preview terms: a face left of
/// the target band tells the user to move right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalHint {
    MoveLeft,
    MoveRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalHint {
    MoveUp,
    MoveDown,
}

/// Per-frame guidance code, recomputed every frame and never persisted.
///
/// Precedence is fixed: no-face > fill range > centering > hold-still.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// No detection, or detector confidence below threshold.
    NoFaceDetected,
    /// Face box area below the region's minimum fill.
    TooFar,
    /// Face box area above the region's maximum fill.
    TooClose,
    /// Face is the right size but off-center on one or both axes.
    Adjust {
        horizontal: Option<HorizontalHint>,
        vertical: Option<VerticalHint>,
    },
    /// All checks passed.
    HoldStill,
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feedback::NoFaceDetected => write!(f, "No face detected"),
            Feedback::TooFar => write!(f, "Move closer to the camera"),
            Feedback::TooClose => write!(f, "Move further from the camera"),
            Feedback::Adjust {
                horizontal,
                vertical,
            } => {
                match horizontal {
                    Some(HorizontalHint::MoveLeft) => write!(f, "Move left")?,
                    Some(HorizontalHint::MoveRight) => write!(f, "Move right")?,
                    None => {}
                }
                match (horizontal, vertical) {
                    (Some(_), Some(VerticalHint::MoveDown)) => write!(f, " & down"),
                    (Some(_), Some(VerticalHint::MoveUp)) => write!(f, " & up"),
                    (None, Some(VerticalHint::MoveDown)) => write!(f, "Move down"),
                    (None, Some(VerticalHint::MoveUp)) => write!(f, "Move up"),
                    (_, None) => Ok(()),
                }
            }
            Feedback::HoldStill => write!(f, "Hold still"),
        }
    }
}
