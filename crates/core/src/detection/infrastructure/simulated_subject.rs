use std::sync::{Arc, Mutex};

use crate::detection::domain::face_detector::FaceDetector;
use crate::geometry::capture_region::CaptureRegion;
use crate::shared::config::CaptureConfig;
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;
use crate::shared::mode::CaptureMode;
use crate::shared::stage::CaptureStage;

/// A cooperative simulated subject.
///
/// Wanders (no detection) for a configured number of ticks, then holds
/// a face sized and centered for whatever stage the session is in. The
/// presenter mirrors the current stage into the shared handle, so the
/// subject repositions itself after every stage transition. Stands in
/// for a real detector in the CLI simulation and integration tests.
pub struct SimulatedSubject {
    stage: Arc<Mutex<CaptureStage>>,
    mode: CaptureMode,
    config: CaptureConfig,
    wander_ticks: usize,
    fill: f64,
    confidence: f64,
    calls: usize,
}

impl SimulatedSubject {
    pub fn new(mode: CaptureMode, config: CaptureConfig, wander_ticks: usize) -> Self {
        Self {
            stage: Arc::new(Mutex::new(CaptureStage::Standard)),
            mode,
            config,
            wander_ticks,
            fill: 0.95,
            confidence: 0.9,
            calls: 0,
        }
    }

    /// Face area as a fraction of the region area. Values outside the
    /// configured fill range make the subject permanently invalid.
    pub fn with_fill(mut self, fill: f64) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Shared stage cell; hand this to whatever observes session
    /// snapshots so the subject tracks stage changes.
    pub fn stage_handle(&self) -> Arc<Mutex<CaptureStage>> {
        self.stage.clone()
    }
}

impl FaceDetector for SimulatedSubject {
    fn detect(
        &mut self,
        frame: &Frame,
        _timestamp_ms: u64,
    ) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        self.calls += 1;
        if self.calls <= self.wander_ticks {
            return Ok(Vec::new());
        }
        let stage = *self
            .stage
            .lock()
            .map_err(|_| "stage handle poisoned".to_owned())?;
        let region = CaptureRegion::compute(
            f64::from(frame.width()),
            f64::from(frame.height()),
            stage,
            self.mode,
            &self.config,
        );
        let side = (region.area() * self.fill).sqrt();
        Ok(vec![Detection {
            x: region.center_x - side / 2.0,
            y: region.target_center_y() - side / 2.0,
            width: side,
            height: side,
            confidence: self.confidence,
        }])
    }
}
