use std::collections::BTreeMap;

use thiserror::Error;

use crate::packaging::domain::archive_writer::{ArchiveWriter, DeliverySink};
use crate::recording::coordinator::StageArtifacts;
use crate::shared::mode::CaptureMode;
use crate::shared::stage::CaptureStage;

#[derive(Error, Debug)]
pub enum PackagingError {
    #[error("missing artifacts for stage {stage}")]
    MissingStage { stage: CaptureStage },
    #[error("packager already consumed")]
    AlreadyConsumed,
    #[error("failed to assemble bundle: {0}")]
    Archive(String),
    #[error("failed to deliver bundle {name}: {message}")]
    Delivery { name: String, message: String },
}

/// Assembles the session's artifacts into one delivered bundle.
///
/// Entry names follow `face-capture-{label}-{timestamp}.{ext}`; the
/// bundle itself is `face-captures-{timestamp}`. Only stages in the
/// mode's sequence are packaged, so a flash capture recorded under a
/// mode later narrowed to two stages would simply be omitted.
pub struct OutputPackager {
    archive: Option<Box<dyn ArchiveWriter>>,
    sink: Box<dyn DeliverySink>,
}

impl OutputPackager {
    pub fn new(archive: Box<dyn ArchiveWriter>, sink: Box<dyn DeliverySink>) -> Self {
        Self {
            archive: Some(archive),
            sink,
        }
    }

    pub fn package(
        &mut self,
        artifacts: &BTreeMap<CaptureStage, StageArtifacts>,
        mode: CaptureMode,
        timestamp: &str,
    ) -> Result<(), PackagingError> {
        let mut archive = self.archive.take().ok_or(PackagingError::AlreadyConsumed)?;

        for &stage in mode.stage_sequence() {
            let stage_artifacts = artifacts
                .get(&stage)
                .ok_or(PackagingError::MissingStage { stage })?;
            let label = entry_label(stage, mode);
            let video_name = format!(
                "face-capture-{label}-{timestamp}.{}",
                stage_artifacts.video.format.extension()
            );
            let photo_name = format!("face-capture-{label}-{timestamp}.jpg");
            archive
                .add_entry(&video_name, &stage_artifacts.video.data)
                .map_err(|e| PackagingError::Archive(e.to_string()))?;
            archive
                .add_entry(&photo_name, &stage_artifacts.photo.data)
                .map_err(|e| PackagingError::Archive(e.to_string()))?;
        }

        let summary = archive
            .finalize()
            .map_err(|e| PackagingError::Archive(e.to_string()))?;
        let bundle_name = format!("face-captures-{timestamp}.{}", archive.extension());
        self.sink
            .deliver(&bundle_name, &summary)
            .map_err(|e| PackagingError::Delivery {
                name: bundle_name.clone(),
                message: e.to_string(),
            })?;
        log::info!("delivered bundle {bundle_name}");
        // Dropping the writer here releases any buffers it still holds.
        Ok(())
    }
}

/// Filename label for a stage: flash entries are named after the mode
/// so MSB and VIB bundles are distinguishable at a glance.
fn entry_label(stage: CaptureStage, mode: CaptureMode) -> &'static str {
    match stage {
        CaptureStage::Standard => "standard",
        CaptureStage::Wide => "wide",
        CaptureStage::FlashReflection => mode.label(),
    }
}
