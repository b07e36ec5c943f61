use crate::camera::domain::camera_source::{CameraConstraints, CameraSource, FrameSource};
use crate::camera::infrastructure::synthetic_camera::SyntheticCamera;
use crate::detection::domain::face_detector::FaceDetector;
use crate::packaging::packager::OutputPackager;
use crate::recording::coordinator::RecordingCoordinator;
use crate::recording::domain::recorder_backend::RecordingFormat;
use crate::session::error::CaptureError;
use crate::session::phase::SessionSnapshot;
use crate::session::state_machine::{CaptureStateMachine, TickAction};
use crate::shared::clock::{Clock, MonotonicClock};
use crate::shared::detection::Detection;

/// Consumes session snapshots for display. The presenter never feeds
/// anything back into validation or sequencing.
pub trait SessionPresenter: Send {
    fn present(&mut self, snapshot: &SessionSnapshot);
}

/// Presenter that discards snapshots.
pub struct NullPresenter;

impl SessionPresenter for NullPresenter {
    fn present(&mut self, _snapshot: &SessionSnapshot) {}
}

/// Single cooperative loop driving one capture session end to end:
/// acquire frame → detect → validate → tick, paced at the configured
/// frame rate. A new cycle is never issued before the previous one
/// (including a blocking detector call) completes.
pub struct SessionRunner {
    machine: CaptureStateMachine,
    coordinator: RecordingCoordinator,
    packager: OutputPackager,
    detector: Box<dyn FaceDetector>,
    clock: Box<dyn Clock>,
    camera: Box<dyn CameraSource>,
    presenter: Box<dyn SessionPresenter>,
    constraints: CameraConstraints,
    timestamp: String,
    tick_limit: Option<u64>,
}

impl SessionRunner {
    pub fn new(
        machine: CaptureStateMachine,
        coordinator: RecordingCoordinator,
        packager: OutputPackager,
        detector: Box<dyn FaceDetector>,
        timestamp: String,
    ) -> Self {
        Self {
            machine,
            coordinator,
            packager,
            detector,
            clock: Box::new(MonotonicClock::new()),
            camera: Box::new(SyntheticCamera::default()),
            presenter: Box::new(NullPresenter),
            constraints: CameraConstraints::default(),
            timestamp,
            tick_limit: None,
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_camera(mut self, camera: Box<dyn CameraSource>) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_presenter(mut self, presenter: Box<dyn SessionPresenter>) -> Self {
        self.presenter = presenter;
        self
    }

    pub fn with_constraints(mut self, constraints: CameraConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Caps the number of evaluation cycles; the session fails with
    /// `Stalled` when the cap is hit. Keeps simulations from spinning
    /// forever on a subject that never positions correctly.
    pub fn with_tick_limit(mut self, ticks: u64) -> Self {
        self.tick_limit = Some(ticks);
        self
    }

    /// Runs the session to completion or terminal failure. The camera
    /// and any live recording are released before this returns.
    pub fn run(&mut self) -> Result<(), CaptureError> {
        self.coordinator.negotiate(RecordingFormat::PREFERRED)?;
        let mut source = self.camera.acquire(&self.constraints)?;
        log::info!("capture session started ({} mode)", self.machine.mode());

        let result = self.drive(source.as_mut());
        self.coordinator.shutdown();
        source.release();
        if result.is_ok() {
            log::info!("capture session complete");
        }
        result
    }

    fn drive(&mut self, source: &mut dyn FrameSource) -> Result<(), CaptureError> {
        let interval = self.machine.config().frame_interval();
        let mut next_tick = self.clock.now();
        let mut ticks: u64 = 0;

        loop {
            let now = self.clock.now();
            if now < next_tick {
                self.clock.sleep(next_tick - now);
                continue;
            }
            next_tick = now + interval;
            if let Some(limit) = self.tick_limit {
                if ticks >= limit {
                    return Err(CaptureError::Stalled { ticks });
                }
            }
            ticks += 1;

            let frame = source.current_frame()?;
            self.machine
                .resize(f64::from(frame.width()), f64::from(frame.height()));

            let detections = match self.detector.detect(&frame, now.as_millis() as u64) {
                Ok(detections) => detections,
                Err(e) => {
                    log::warn!("face detection failed, treating frame as empty: {e}");
                    Vec::new()
                }
            };
            let best = Detection::best_of(&detections).copied();

            let outcome = self
                .machine
                .tick(now, &frame, best.as_ref(), &mut self.coordinator);
            self.presenter.present(&outcome.snapshot);

            match outcome.action {
                None => {}
                Some(TickAction::Fail(err)) => return Err(err),
                Some(TickAction::Package) => {
                    let packaged = self.packager.package(
                        self.machine.artifacts(),
                        self.machine.mode(),
                        &self.timestamp,
                    );
                    match packaged {
                        Ok(()) => {
                            self.machine.mark_complete();
                            self.presenter.present(&self.machine.snapshot(now));
                            return Ok(());
                        }
                        Err(e) => {
                            self.machine.mark_packaging_failed();
                            self.presenter.present(&self.machine.snapshot(now));
                            return Err(CaptureError::Packaging(e));
                        }
                    }
                }
            }
        }
    }
}
