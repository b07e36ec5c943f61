/// One detected face bounding box in output-canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub confidence: f64,
}

impl Detection {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Picks the highest-confidence detection. Ties keep the earlier one,
    /// so a frame with equal scores is handled deterministically.
    pub fn best_of(detections: &[Detection]) -> Option<&Detection> {
        detections
            .iter()
            .fold(None, |best: Option<&Detection>, candidate| match best {
                Some(b) if candidate.confidence > b.confidence => Some(candidate),
                Some(b) => Some(b),
                None => Some(candidate),
            })
    }
}
