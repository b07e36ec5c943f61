use std::path::PathBuf;
use std::process;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use crossbeam_channel::unbounded;

use facecapture_core::camera::domain::camera_source::CameraConstraints;
use facecapture_core::detection::infrastructure::simulated_subject::SimulatedSubject;
use facecapture_core::packaging::infrastructure::directory_bundle::{
    DirectoryArchiveWriter, FileDeliverySink,
};
use facecapture_core::packaging::packager::OutputPackager;
use facecapture_core::recording::coordinator::RecordingCoordinator;
use facecapture_core::recording::domain::recorder_backend::RecordingFormat;
use facecapture_core::recording::infrastructure::memory_recorder::MemoryRecorder;
use facecapture_core::session::phase::SessionSnapshot;
use facecapture_core::session::runner::{SessionPresenter, SessionRunner};
use facecapture_core::session::state_machine::CaptureStateMachine;
use facecapture_core::shared::clock::ManualClock;
use facecapture_core::shared::config::CaptureConfig;
use facecapture_core::shared::mode::CaptureMode;
use facecapture_core::shared::stage::CaptureStage;

/// Guided multi-stage face capture, driven end to end against a
/// simulated camera, detector, and recorder.
#[derive(Parser)]
#[command(name = "facecapture")]
struct Cli {
    /// Capture mode: noflash, red, orange, vib_flash, msb_flash.
    #[arg(long, default_value = "noflash")]
    mode: String,

    /// Directory the capture bundle is written to.
    #[arg(long, default_value = "captures")]
    output: PathBuf,

    /// JSON file overriding the default capture thresholds.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Camera width in pixels.
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Camera height in pixels.
    #[arg(long, default_value = "720")]
    height: u32,

    /// Ticks the simulated subject wanders before holding a valid pose.
    #[arg(long, default_value = "15")]
    wander: usize,

    /// Recording formats the simulated recorder supports (comma-separated).
    #[arg(long, value_delimiter = ',', default_value = "mp4,webm")]
    formats: Vec<String>,

    /// Abort if the session has not finished after this many ticks.
    #[arg(long, default_value = "100000")]
    max_ticks: u64,

    /// Pace the session at the configured frame rate instead of
    /// running on a simulated clock.
    #[arg(long)]
    realtime: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let mode: CaptureMode = cli.mode.parse()?;
    let formats = parse_formats(&cli.formats)?;
    let config = match &cli.config {
        Some(path) => CaptureConfig::load(path)?,
        None => CaptureConfig::default(),
    };
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)?
        .as_secs()
        .to_string();

    let (events_tx, events_rx) = unbounded();
    let recorder = MemoryRecorder::new(events_tx, formats);
    let coordinator =
        RecordingCoordinator::new(Box::new(recorder), events_rx, config.photo_quality);

    let machine = CaptureStateMachine::new(
        mode,
        f64::from(cli.width),
        f64::from(cli.height),
        config.clone(),
    );
    let packager = OutputPackager::new(
        Box::new(DirectoryArchiveWriter::new(&cli.output)),
        Box::new(FileDeliverySink::new(&cli.output)),
    );
    let subject = SimulatedSubject::new(mode, config, cli.wander);
    let presenter = ConsolePresenter::new(subject.stage_handle());

    let mut runner = SessionRunner::new(
        machine,
        coordinator,
        packager,
        Box::new(subject),
        timestamp,
    )
    .with_constraints(CameraConstraints {
        ideal_width: cli.width,
        ideal_height: cli.height,
    })
    .with_presenter(Box::new(presenter))
    .with_tick_limit(cli.max_ticks);
    if !cli.realtime {
        runner = runner.with_clock(Box::new(ManualClock::new()));
    }

    runner.run()?;
    log::info!("Bundle written to {}", cli.output.display());
    Ok(())
}

/// Prints instruction changes and mirrors the current stage back to
/// the simulated subject.
struct ConsolePresenter {
    stage: Arc<Mutex<CaptureStage>>,
    last_instruction: String,
    flash_was_visible: bool,
}

impl ConsolePresenter {
    fn new(stage: Arc<Mutex<CaptureStage>>) -> Self {
        Self {
            stage,
            last_instruction: String::new(),
            flash_was_visible: false,
        }
    }
}

impl SessionPresenter for ConsolePresenter {
    fn present(&mut self, snapshot: &SessionSnapshot) {
        if let Ok(mut stage) = self.stage.lock() {
            *stage = snapshot.stage;
        }
        if snapshot.instruction != self.last_instruction {
            eprintln!(
                "[{} {}/{}] {}",
                snapshot.stage,
                snapshot.stage_index + 1,
                snapshot.stage_count,
                snapshot.instruction
            );
            self.last_instruction = snapshot.instruction.clone();
        }
        if snapshot.flash_visible != self.flash_was_visible {
            log::debug!(
                "flash {}",
                if snapshot.flash_visible { "on" } else { "off" }
            );
            self.flash_was_visible = snapshot.flash_visible;
        }
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.width == 0 || cli.height == 0 {
        return Err(format!(
            "Camera dimensions must be positive, got {}x{}",
            cli.width, cli.height
        )
        .into());
    }
    if cli.max_ticks == 0 {
        return Err("Max ticks must be positive".into());
    }
    if cli.formats.is_empty() {
        return Err("At least one recording format is required".into());
    }
    Ok(())
}

fn parse_formats(names: &[String]) -> Result<Vec<RecordingFormat>, Box<dyn std::error::Error>> {
    names
        .iter()
        .map(|name| match name.as_str() {
            "mp4" => Ok(RecordingFormat::Mp4),
            "webm" => Ok(RecordingFormat::WebM),
            other => Err(format!("Unknown recording format '{other}' (expected mp4 or webm)").into()),
        })
        .collect()
}
