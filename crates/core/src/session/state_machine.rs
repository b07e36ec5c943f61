use std::collections::BTreeMap;
use std::time::Duration;

use crate::geometry::capture_region::CaptureRegion;
use crate::recording::coordinator::{RecordingCoordinator, StageArtifacts, VideoArtifact};
use crate::session::error::CaptureError;
use crate::session::phase::{FailureKind, Phase, SessionSnapshot};
use crate::shared::config::CaptureConfig;
use crate::shared::detection::Detection;
use crate::shared::frame::Frame;
use crate::shared::mode::CaptureMode;
use crate::shared::stage::CaptureStage;
use crate::validation::feedback::Feedback;
use crate::validation::frame_validator::FrameValidator;

/// Something the owning loop must do as a consequence of a tick.
#[derive(Debug)]
pub enum TickAction {
    /// Final stage captured: hand the artifact map to the packager,
    /// then report back with `mark_complete` or `mark_packaging_failed`.
    Package,
    /// The session just entered a terminal failure.
    Fail(CaptureError),
}

#[derive(Debug)]
pub struct TickOutcome {
    pub snapshot: SessionSnapshot,
    pub action: Option<TickAction>,
}

/// Owns all mutable session state and drives the per-stage cycle
/// `Positioning → Countdown → Processing → next stage | packaging`.
///
/// Ticked from a single cooperative loop; recording completion arrives
/// asynchronously through the coordinator and is only observed on a
/// later tick, never assumed synchronous.
pub struct CaptureStateMachine {
    config: CaptureConfig,
    validator: FrameValidator,
    mode: CaptureMode,
    canvas_width: f64,
    canvas_height: f64,
    stage_index: usize,
    region: CaptureRegion,
    phase: Phase,
    valid: bool,
    settle_until: Option<Duration>,
    last_feedback: Option<Feedback>,
    package_requested: bool,
    artifacts: BTreeMap<CaptureStage, StageArtifacts>,
}

impl CaptureStateMachine {
    pub fn new(mode: CaptureMode, canvas_width: f64, canvas_height: f64, config: CaptureConfig) -> Self {
        let validator = FrameValidator::new(&config);
        let region = CaptureRegion::compute(
            canvas_width,
            canvas_height,
            CaptureStage::Standard,
            mode,
            &config,
        );
        Self {
            config,
            validator,
            mode,
            canvas_width,
            canvas_height,
            stage_index: 0,
            region,
            phase: Phase::Idle,
            valid: false,
            settle_until: None,
            last_feedback: None,
            package_requested: false,
            artifacts: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn stage(&self) -> CaptureStage {
        self.mode.stage_sequence()[self.stage_index]
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn region(&self) -> &CaptureRegion {
        &self.region
    }

    pub fn artifacts(&self) -> &BTreeMap<CaptureStage, StageArtifacts> {
        &self.artifacts
    }

    /// Advances the session by one evaluation cycle.
    ///
    /// `frame` is the frame the detection was computed on; it becomes
    /// the stage's still photo when the stage finalizes on this tick.
    pub fn tick(
        &mut self,
        now: Duration,
        frame: &Frame,
        detection: Option<&Detection>,
        recorder: &mut RecordingCoordinator,
    ) -> TickOutcome {
        recorder.poll();
        if matches!(self.phase, Phase::Idle) {
            self.phase = Phase::Positioning;
        }

        let mut action = None;
        match self.phase {
            Phase::Positioning => {
                let verdict = self.validator.evaluate(detection, &self.region);
                self.valid = verdict.valid;
                self.last_feedback = Some(verdict.feedback);
                if self.settle_until.is_some_and(|until| now >= until) {
                    self.settle_until = None;
                }
                if verdict.valid {
                    // Validity returning cuts the settle message short.
                    self.settle_until = None;
                    match recorder.start() {
                        Ok(handle) => {
                            log::debug!(
                                "countdown started on the {} stage (recording {handle})",
                                self.stage()
                            );
                            self.phase = Phase::Countdown { started_at: now };
                        }
                        Err(e) => {
                            log::error!("unable to start recording: {e}");
                            self.phase = Phase::Failed(FailureKind::RecordingCapability);
                            action = Some(TickAction::Fail(CaptureError::Recording(e)));
                        }
                    }
                }
            }
            Phase::Countdown { started_at } => {
                let verdict = self.validator.evaluate(detection, &self.region);
                self.last_feedback = Some(verdict.feedback);
                if !verdict.valid {
                    // Restart from zero: the partial recording is
                    // worthless once the pose breaks.
                    self.valid = false;
                    recorder.abort();
                    self.settle_until = Some(now + self.config.settle_delay());
                    self.phase = Phase::Positioning;
                    log::debug!("countdown cancelled on the {} stage", self.stage());
                } else if now - started_at >= self.config.countdown() {
                    recorder.request_stop();
                    self.phase = Phase::Processing;
                }
            }
            Phase::Processing => {
                if let Some(video) = recorder.take_finished() {
                    action = self.finalize_stage(video, frame, recorder);
                }
            }
            Phase::Idle | Phase::Complete | Phase::Failed(_) => {}
        }

        TickOutcome {
            snapshot: self.snapshot(now),
            action,
        }
    }

    fn finalize_stage(
        &mut self,
        video: VideoArtifact,
        frame: &Frame,
        recorder: &RecordingCoordinator,
    ) -> Option<TickAction> {
        let stage = self.stage();
        if video.data.is_empty() {
            log::error!("recording for the {stage} stage produced no data");
            self.phase = Phase::Failed(FailureKind::EmptyCapture);
            return Some(TickAction::Fail(CaptureError::EmptyCapture { stage }));
        }
        let photo = match recorder.capture_photo(frame) {
            Ok(photo) => photo,
            Err(e) => {
                log::error!("photo capture failed on the {stage} stage: {e}");
                self.phase = Phase::Failed(FailureKind::PhotoCapture);
                return Some(TickAction::Fail(CaptureError::Recording(e)));
            }
        };
        self.artifacts.insert(stage, StageArtifacts { video, photo });
        log::info!("{stage} stage captured");

        if self.stage_index + 1 < self.mode.stage_sequence().len() {
            self.advance_stage();
            None
        } else if self.package_requested {
            None
        } else {
            self.package_requested = true;
            Some(TickAction::Package)
        }
    }

    fn advance_stage(&mut self) {
        self.stage_index += 1;
        self.valid = false;
        self.settle_until = None;
        self.last_feedback = None;
        self.phase = Phase::Positioning;
        self.region = CaptureRegion::compute(
            self.canvas_width,
            self.canvas_height,
            self.stage(),
            self.mode,
            &self.config,
        );
        log::info!("advancing to the {} stage", self.stage());
    }

    /// Called by the owner after `TickAction::Package` succeeded.
    pub fn mark_complete(&mut self) {
        self.valid = false;
        self.phase = Phase::Complete;
    }

    /// Called by the owner after `TickAction::Package` failed. Captured
    /// artifacts are kept, but delivery requires a fresh session.
    pub fn mark_packaging_failed(&mut self) {
        self.valid = false;
        self.phase = Phase::Failed(FailureKind::Packaging);
    }

    /// Recomputes the region when the canvas geometry changes. No-op
    /// for identical dimensions.
    pub fn resize(&mut self, canvas_width: f64, canvas_height: f64) {
        if (self.canvas_width, self.canvas_height) == (canvas_width, canvas_height) {
            return;
        }
        self.canvas_width = canvas_width;
        self.canvas_height = canvas_height;
        self.region = CaptureRegion::compute(
            canvas_width,
            canvas_height,
            self.stage(),
            self.mode,
            &self.config,
        );
    }

    /// Switching modes mid-session would orphan captured artifacts, so
    /// a mode change restarts the session outright.
    pub fn set_mode(&mut self, mode: CaptureMode) {
        self.mode = mode;
        self.reset();
    }

    /// Wholesale reset back to the first stage. The caller is
    /// responsible for stopping any live recording.
    pub fn reset(&mut self) {
        self.stage_index = 0;
        self.phase = Phase::Idle;
        self.valid = false;
        self.settle_until = None;
        self.last_feedback = None;
        self.package_requested = false;
        self.artifacts.clear();
        self.region = CaptureRegion::compute(
            self.canvas_width,
            self.canvas_height,
            self.stage(),
            self.mode,
            &self.config,
        );
    }

    pub fn snapshot(&self, now: Duration) -> SessionSnapshot {
        let sequence = self.mode.stage_sequence();
        SessionSnapshot {
            stage: self.stage(),
            stage_index: self.stage_index,
            stage_count: sequence.len(),
            phase: self.phase,
            valid: self.valid,
            instruction: self.instruction(now),
            progress_percent: self.progress_percent(now),
            show_progress: matches!(self.phase, Phase::Countdown { .. }),
            flash_visible: self.flash_visible(now),
            show_restart: self.phase.is_terminal(),
        }
    }

    fn progress_percent(&self, now: Duration) -> f64 {
        match self.phase {
            Phase::Countdown { started_at } => {
                let elapsed = (now - started_at).as_secs_f64();
                (elapsed / self.config.countdown_secs).min(1.0) * 100.0
            }
            _ => 0.0,
        }
    }

    /// Flash overlay visibility. Blink modes toggle on the interval
    /// once a quarter of the countdown has elapsed; the solid variants
    /// stay lit for the whole flash-reflection countdown.
    fn flash_visible(&self, now: Duration) -> bool {
        let Phase::Countdown { started_at } = self.phase else {
            return false;
        };
        if self.mode.blinks() {
            let elapsed = (now - started_at).as_secs_f64();
            if elapsed <= self.config.countdown_secs / 4.0 {
                return false;
            }
            let interval = self.config.flash_interval_secs;
            elapsed % interval >= interval / 2.0
        } else {
            self.mode.is_flash_variant() && self.stage() == CaptureStage::FlashReflection
        }
    }

    fn instruction(&self, now: Duration) -> String {
        match self.phase {
            Phase::Idle => stage_entry_text(self.stage()).to_owned(),
            Phase::Positioning => {
                if self.settle_until.is_some_and(|until| now < until) {
                    return "Please keep your face in position".to_owned();
                }
                match self.last_feedback {
                    None => stage_entry_text(self.stage()).to_owned(),
                    Some(Feedback::NoFaceDetected) => if self.stage_index == 0 {
                        "No face detected"
                    } else {
                        "No face detected for second capture"
                    }
                    .to_owned(),
                    Some(Feedback::HoldStill) => if self.stage() == CaptureStage::Standard {
                        "Position your face in the oval"
                    } else {
                        "Position your face in the wider oval"
                    }
                    .to_owned(),
                    Some(feedback) => feedback.to_string(),
                }
            }
            Phase::Countdown { .. } => {
                format!("Hold still for {} seconds", self.config.countdown_secs)
            }
            Phase::Processing => "Processing captures...".to_owned(),
            Phase::Complete => "All captures saved!".to_owned(),
            Phase::Failed(kind) => match kind {
                FailureKind::RecordingCapability => "Recording not supported on this device",
                FailureKind::EmptyCapture | FailureKind::PhotoCapture => {
                    "Error processing captures"
                }
                FailureKind::Packaging => "Error saving files",
            }
            .to_owned(),
        }
    }
}

/// Guidance shown on stage entry, before any detection has been seen.
fn stage_entry_text(stage: CaptureStage) -> &'static str {
    match stage {
        CaptureStage::Standard => "Position your face in the oval",
        CaptureStage::Wide => "Position for second capture (larger frame)",
        CaptureStage::FlashReflection => "Position for Flash Capture (Light Reflection Frame)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::domain::recorder_backend::RecordingFormat;
    use crate::recording::infrastructure::memory_recorder::MemoryRecorder;
    use approx::assert_relative_eq;
    use crossbeam_channel::unbounded;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn frame() -> Frame {
        Frame::solid(8, 8, [10, 20, 30])
    }

    fn recorder() -> RecordingCoordinator {
        recorder_with_chunks(3)
    }

    fn recorder_with_chunks(chunks: usize) -> RecordingCoordinator {
        let (tx, rx) = unbounded();
        let backend = MemoryRecorder::new(tx, vec![RecordingFormat::Mp4])
            .with_chunks_per_attempt(chunks);
        let mut coordinator = RecordingCoordinator::new(Box::new(backend), rx, 95);
        coordinator.negotiate(RecordingFormat::PREFERRED).unwrap();
        coordinator
    }

    fn machine(mode: CaptureMode) -> CaptureStateMachine {
        CaptureStateMachine::new(mode, 800.0, 600.0, CaptureConfig::default())
    }

    /// A detection that passes every check for the machine's current region.
    fn valid_face(region: &CaptureRegion) -> Detection {
        let side = (region.area() * 0.91).sqrt();
        Detection {
            x: region.center_x - side / 2.0,
            y: region.target_center_y() - side / 2.0,
            width: side,
            height: side,
            confidence: 0.95,
        }
    }

    /// Ticks with a valid face at 0.1 s steps until the stage changes or
    /// an action fires.
    fn drive_stage(
        m: &mut CaptureStateMachine,
        rec: &mut RecordingCoordinator,
        t: &mut f64,
    ) -> Option<TickAction> {
        let initial = m.stage();
        for _ in 0..400 {
            let face = valid_face(m.region());
            let out = m.tick(secs(*t), &frame(), Some(&face), rec);
            *t += 0.1;
            if out.action.is_some() {
                return out.action;
            }
            if m.stage() != initial {
                return None;
            }
        }
        panic!("stage never completed");
    }

    #[test]
    fn test_fresh_machine_shows_stage_entry_guidance() {
        let m = machine(CaptureMode::NoFlash);
        let snap = m.snapshot(Duration::ZERO);
        assert_eq!(snap.instruction, "Position your face in the oval");
        assert_eq!(snap.stage, CaptureStage::Standard);
        assert_eq!(snap.stage_count, 2);
        assert!(!snap.show_restart);
    }

    #[test]
    fn test_valid_face_starts_countdown_and_recording() {
        let mut m = machine(CaptureMode::NoFlash);
        let mut rec = recorder();
        let face = valid_face(m.region());
        let out = m.tick(secs(1.0), &frame(), Some(&face), &mut rec);

        assert_eq!(
            m.phase(),
            Phase::Countdown {
                started_at: secs(1.0)
            }
        );
        assert!(rec.is_recording());
        assert!(out.snapshot.show_progress);
        assert_eq!(out.snapshot.instruction, "Hold still for 5 seconds");
    }

    #[test]
    fn test_no_face_keeps_positioning() {
        let mut m = machine(CaptureMode::NoFlash);
        let mut rec = recorder();
        let out = m.tick(secs(0.1), &frame(), None, &mut rec);
        assert_eq!(m.phase(), Phase::Positioning);
        assert!(!rec.is_recording());
        assert_eq!(out.snapshot.instruction, "No face detected");
        assert!(!out.snapshot.valid);
    }

    #[test]
    fn test_countdown_completes_into_processing() {
        // Validity continuously true, elapsed 5.2 s >= 5 s.
        let mut m = machine(CaptureMode::NoFlash);
        let mut rec = recorder();
        let face = valid_face(m.region());
        m.tick(secs(0.0), &frame(), Some(&face), &mut rec);
        m.tick(secs(5.2), &frame(), Some(&face), &mut rec);
        assert_eq!(m.phase(), Phase::Processing);
        assert!(!rec.is_recording());
    }

    #[test]
    fn test_validity_loss_cancels_and_restarts_from_zero() {
        let mut m = machine(CaptureMode::NoFlash);
        let mut rec = recorder();
        let face = valid_face(m.region());

        m.tick(secs(0.0), &frame(), Some(&face), &mut rec);
        // Validity drops at 2.9 s: cancel, back to positioning.
        let out = m.tick(secs(2.9), &frame(), None, &mut rec);
        assert_eq!(m.phase(), Phase::Positioning);
        assert!(!rec.is_recording());
        assert!(!out.snapshot.show_progress);

        // Validity returns at 3.5 s: countdown restarts from zero,
        // so 4.9 s of elapsed wall time is not enough.
        m.tick(secs(3.5), &frame(), Some(&face), &mut rec);
        m.tick(secs(8.4), &frame(), Some(&face), &mut rec);
        assert!(matches!(m.phase(), Phase::Countdown { .. }));
        m.tick(secs(8.6), &frame(), Some(&face), &mut rec);
        assert_eq!(m.phase(), Phase::Processing);
    }

    #[test]
    fn test_settle_message_after_cancel_until_delay_expires() {
        let mut m = machine(CaptureMode::NoFlash);
        let mut rec = recorder();
        let face = valid_face(m.region());

        m.tick(secs(0.0), &frame(), Some(&face), &mut rec);
        let cancelled = m.tick(secs(1.0), &frame(), None, &mut rec);
        assert_eq!(cancelled.snapshot.instruction, "Please keep your face in position");

        let still_settling = m.tick(secs(2.5), &frame(), None, &mut rec);
        assert_eq!(
            still_settling.snapshot.instruction,
            "Please keep your face in position"
        );

        // 2 s settle delay expired: plain guidance again.
        let after = m.tick(secs(3.1), &frame(), None, &mut rec);
        assert_eq!(after.snapshot.instruction, "No face detected");
    }

    #[test]
    fn test_stage_advance_recomputes_region_and_resets_validity() {
        let mut m = machine(CaptureMode::NoFlash);
        let mut rec = recorder();
        let mut t = 0.0;
        let action = drive_stage(&mut m, &mut rec, &mut t);
        assert!(action.is_none());

        assert_eq!(m.stage(), CaptureStage::Wide);
        assert_eq!(m.phase(), Phase::Positioning);
        assert_relative_eq!(m.region().width, 520.0); // 0.65 * 800
        let snap = m.snapshot(secs(t));
        assert!(!snap.valid);
        assert_eq!(snap.instruction, "Position for second capture (larger frame)");
        assert!(m.artifacts().contains_key(&CaptureStage::Standard));
    }

    #[test]
    fn test_final_stage_emits_package_action_once() {
        let mut m = machine(CaptureMode::NoFlash);
        let mut rec = recorder();
        let mut t = 0.0;
        assert!(drive_stage(&mut m, &mut rec, &mut t).is_none());
        let action = drive_stage(&mut m, &mut rec, &mut t);
        assert!(matches!(action, Some(TickAction::Package)));
        assert_eq!(m.phase(), Phase::Processing);
        assert_eq!(m.artifacts().len(), 2);

        // Still processing until the owner reports back; no re-emission.
        let face = valid_face(m.region());
        let out = m.tick(secs(t), &frame(), Some(&face), &mut rec);
        assert!(out.action.is_none());

        m.mark_complete();
        assert_eq!(m.phase(), Phase::Complete);
        let snap = m.snapshot(secs(t));
        assert_eq!(snap.instruction, "All captures saved!");
        assert!(snap.show_restart);
    }

    #[test]
    fn test_flash_mode_runs_three_stages() {
        let mut m = machine(CaptureMode::MsbFlash);
        let mut rec = recorder();
        // Compact region on the standard stage for this mode.
        assert_relative_eq!(m.region().width, 360.0); // 0.45 * 800

        let mut t = 0.0;
        assert!(drive_stage(&mut m, &mut rec, &mut t).is_none());
        assert_eq!(m.stage(), CaptureStage::Wide);
        assert!(drive_stage(&mut m, &mut rec, &mut t).is_none());
        assert_eq!(m.stage(), CaptureStage::FlashReflection);
        let action = drive_stage(&mut m, &mut rec, &mut t);
        assert!(matches!(action, Some(TickAction::Package)));
        assert_eq!(m.artifacts().len(), 3);
    }

    #[test]
    fn test_empty_capture_is_terminal() {
        let mut m = machine(CaptureMode::NoFlash);
        let mut rec = recorder_with_chunks(0);
        let face = valid_face(m.region());
        m.tick(secs(0.0), &frame(), Some(&face), &mut rec);
        m.tick(secs(5.1), &frame(), Some(&face), &mut rec);
        let out = m.tick(secs(5.2), &frame(), Some(&face), &mut rec);

        assert!(matches!(
            out.action,
            Some(TickAction::Fail(CaptureError::EmptyCapture {
                stage: CaptureStage::Standard
            }))
        ));
        assert_eq!(m.phase(), Phase::Failed(FailureKind::EmptyCapture));
        assert_eq!(out.snapshot.instruction, "Error processing captures");
        assert!(out.snapshot.show_restart);

        // Terminal: further ticks change nothing.
        let later = m.tick(secs(6.0), &frame(), Some(&face), &mut rec);
        assert!(later.action.is_none());
        assert_eq!(m.phase(), Phase::Failed(FailureKind::EmptyCapture));
    }

    #[test]
    fn test_blink_flash_hidden_during_first_quarter() {
        let mut m = machine(CaptureMode::Red);
        let mut rec = recorder();
        let face = valid_face(m.region());
        m.tick(secs(0.0), &frame(), Some(&face), &mut rec);

        // Quarter of a 5 s countdown is 1.25 s.
        let early = m.tick(secs(0.5), &frame(), Some(&face), &mut rec);
        assert!(!early.snapshot.flash_visible);

        // 1.3 % 0.8 = 0.5 >= 0.4: visible.
        let on = m.tick(secs(1.3), &frame(), Some(&face), &mut rec);
        assert!(on.snapshot.flash_visible);

        // 1.7 % 0.8 = 0.1 < 0.4: hidden.
        let off = m.tick(secs(1.7), &frame(), Some(&face), &mut rec);
        assert!(!off.snapshot.flash_visible);
    }

    #[test]
    fn test_solid_flash_only_during_flash_stage_countdown() {
        let mut m = machine(CaptureMode::MsbFlash);
        let mut rec = recorder();
        let face = valid_face(m.region());

        // Standard-stage countdown: solid variants stay dark.
        m.tick(secs(0.0), &frame(), Some(&face), &mut rec);
        let standard = m.tick(secs(2.0), &frame(), Some(&face), &mut rec);
        assert!(!standard.snapshot.flash_visible);

        let mut t = 3.0;
        drive_stage(&mut m, &mut rec, &mut t);
        drive_stage(&mut m, &mut rec, &mut t);
        assert_eq!(m.stage(), CaptureStage::FlashReflection);

        // Lit from the very start of the flash-stage countdown.
        let face = valid_face(m.region());
        m.tick(secs(t), &frame(), Some(&face), &mut rec);
        let lit = m.tick(secs(t + 0.1), &frame(), Some(&face), &mut rec);
        assert!(lit.snapshot.flash_visible);
    }

    #[test]
    fn test_no_flash_mode_never_shows_flash() {
        let mut m = machine(CaptureMode::NoFlash);
        let mut rec = recorder();
        let face = valid_face(m.region());
        m.tick(secs(0.0), &frame(), Some(&face), &mut rec);
        for tenths in 1..50 {
            let out = m.tick(secs(tenths as f64 * 0.1), &frame(), Some(&face), &mut rec);
            assert!(!out.snapshot.flash_visible);
            if m.phase() == Phase::Processing {
                break;
            }
        }
    }

    #[test]
    fn test_progress_tracks_countdown() {
        let mut m = machine(CaptureMode::NoFlash);
        let mut rec = recorder();
        let face = valid_face(m.region());
        m.tick(secs(0.0), &frame(), Some(&face), &mut rec);
        let halfway = m.tick(secs(2.5), &frame(), Some(&face), &mut rec);
        assert_relative_eq!(halfway.snapshot.progress_percent, 50.0);
    }

    #[test]
    fn test_hint_feedback_reaches_instruction() {
        let mut m = machine(CaptureMode::NoFlash);
        let mut rec = recorder();
        // Centered but far too small.
        let r = m.region().clone();
        let small = Detection {
            x: r.center_x - 85.0,
            y: r.target_center_y() - 85.0,
            width: 170.0,
            height: 170.0,
            confidence: 0.95,
        };
        let out = m.tick(secs(0.1), &frame(), Some(&small), &mut rec);
        assert_eq!(out.snapshot.instruction, "Move closer to the camera");
    }

    #[test]
    fn test_no_face_text_mentions_second_capture_after_first_stage() {
        let mut m = machine(CaptureMode::NoFlash);
        let mut rec = recorder();
        let mut t = 0.0;
        drive_stage(&mut m, &mut rec, &mut t);
        let out = m.tick(secs(t), &frame(), None, &mut rec);
        assert_eq!(out.snapshot.instruction, "No face detected for second capture");
    }

    #[test]
    fn test_mark_packaging_failed_is_terminal_with_message() {
        let mut m = machine(CaptureMode::NoFlash);
        m.mark_packaging_failed();
        assert_eq!(m.phase(), Phase::Failed(FailureKind::Packaging));
        let snap = m.snapshot(Duration::ZERO);
        assert_eq!(snap.instruction, "Error saving files");
        assert!(snap.show_restart);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut m = machine(CaptureMode::NoFlash);
        let mut rec = recorder();
        let mut t = 0.0;
        drive_stage(&mut m, &mut rec, &mut t);
        assert!(!m.artifacts().is_empty());

        m.reset();
        assert_eq!(m.phase(), Phase::Idle);
        assert_eq!(m.stage(), CaptureStage::Standard);
        assert!(m.artifacts().is_empty());
        assert_relative_eq!(m.region().width, 400.0);
    }

    #[test]
    fn test_set_mode_restarts_session() {
        let mut m = machine(CaptureMode::NoFlash);
        let mut rec = recorder();
        let mut t = 0.0;
        drive_stage(&mut m, &mut rec, &mut t);

        m.set_mode(CaptureMode::MsbFlash);
        assert_eq!(m.mode(), CaptureMode::MsbFlash);
        assert_eq!(m.phase(), Phase::Idle);
        assert!(m.artifacts().is_empty());
        // Compact standard region takes effect immediately.
        assert_relative_eq!(m.region().width, 360.0);
    }

    #[test]
    fn test_resize_recomputes_region() {
        let mut m = machine(CaptureMode::NoFlash);
        m.resize(1000.0, 900.0);
        assert_relative_eq!(m.region().center_x, 500.0);
        assert_relative_eq!(m.region().width, 500.0);
    }
}
