use crossbeam_channel::Receiver;
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

use crate::recording::domain::recorder_backend::{
    RecorderBackend, RecorderEvent, RecordingError, RecordingFormat, RecordingHandle,
};
use crate::shared::frame::Frame;

/// Finalized video for one stage, assembled from backend chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoArtifact {
    pub data: Vec<u8>,
    pub format: RecordingFormat,
}

/// Still photo encoded from the frame current at stage completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoArtifact {
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageArtifacts {
    pub video: VideoArtifact,
    pub photo: PhotoArtifact,
}

/// Owns the recorder backend and turns its asynchronous event stream
/// into per-stage artifacts.
///
/// At most one recording is live at a time. Attempts fall into three
/// buckets: the active one (accumulating chunks), one stopping attempt
/// (awaiting its `Stopped` acknowledgement), and everything else, whose
/// late events are dropped on the floor.
pub struct RecordingCoordinator {
    backend: Box<dyn RecorderBackend>,
    events: Receiver<RecorderEvent>,
    format: Option<RecordingFormat>,
    next_handle: RecordingHandle,
    active: Option<RecordingHandle>,
    stopping: Option<RecordingHandle>,
    chunks: Vec<Vec<u8>>,
    finished: Option<VideoArtifact>,
    photo_quality: u8,
}

impl RecordingCoordinator {
    pub fn new(
        backend: Box<dyn RecorderBackend>,
        events: Receiver<RecorderEvent>,
        photo_quality: u8,
    ) -> Self {
        Self {
            backend,
            events,
            format: None,
            next_handle: 0,
            active: None,
            stopping: None,
            chunks: Vec::new(),
            finished: None,
            photo_quality,
        }
    }

    /// Walks `preference` in order and locks in the first format the
    /// backend supports. Must succeed before any recording starts.
    pub fn negotiate(
        &mut self,
        preference: &[RecordingFormat],
    ) -> Result<RecordingFormat, RecordingError> {
        let format = preference
            .iter()
            .copied()
            .find(|f| self.backend.supports(*f))
            .ok_or(RecordingError::NoSupportedFormat)?;
        log::info!("negotiated recording format: {format}");
        self.format = Some(format);
        Ok(format)
    }

    pub fn format(&self) -> Option<RecordingFormat> {
        self.format
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Begins a fresh recording attempt. Any attempt still live is
    /// stopped and its data discarded first.
    pub fn start(&mut self) -> Result<RecordingHandle, RecordingError> {
        let format = self.format.ok_or(RecordingError::FormatNotNegotiated)?;
        self.abort();
        let handle = self.next_handle;
        self.next_handle += 1;
        self.backend.start(handle, format)?;
        self.active = Some(handle);
        self.chunks.clear();
        log::debug!("recording {handle} started ({format})");
        Ok(handle)
    }

    /// Asks the backend to finalize the active attempt. Accumulated
    /// chunks are kept; chunks arriving after this call are ignored.
    /// The artifact becomes available once `Stopped` is observed.
    pub fn request_stop(&mut self) {
        if let Some(handle) = self.active.take() {
            self.stopping = Some(handle);
            self.backend.stop(handle);
            log::debug!("recording {handle} stop requested");
        }
    }

    /// Stops and discards whatever attempt is live. Used when validity
    /// is lost mid-countdown and on teardown.
    pub fn abort(&mut self) {
        if let Some(handle) = self.active.take() {
            self.backend.stop(handle);
            log::debug!("recording {handle} aborted");
        }
        self.stopping = None;
        self.chunks.clear();
    }

    /// Drains pending backend events. Called once per session tick.
    pub fn poll(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                RecorderEvent::Chunk { handle, data } => {
                    // Zero-byte chunks and chunks from abandoned or
                    // already-stopping attempts carry nothing useful.
                    if self.active == Some(handle) && !data.is_empty() {
                        self.chunks.push(data);
                    }
                }
                RecorderEvent::Stopped { handle } => {
                    if self.stopping == Some(handle) {
                        self.stopping = None;
                        let format = self.format.unwrap_or(RecordingFormat::Mp4);
                        let data = self.chunks.concat();
                        self.chunks.clear();
                        log::debug!("recording {handle} finalized ({} bytes)", data.len());
                        self.finished = Some(VideoArtifact { data, format });
                    }
                }
            }
        }
    }

    /// Takes the finalized video, if a stop has completed since the
    /// last call. The artifact may be empty; the caller decides what an
    /// empty capture means.
    pub fn take_finished(&mut self) -> Option<VideoArtifact> {
        self.finished.take()
    }

    /// Encodes the given frame as a JPEG still.
    pub fn capture_photo(&self, frame: &Frame) -> Result<PhotoArtifact, RecordingError> {
        let mut data = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut data, self.photo_quality);
        encoder.encode(
            frame.data(),
            frame.width(),
            frame.height(),
            ExtendedColorType::Rgb8,
        )?;
        Ok(PhotoArtifact { data })
    }

    /// Teardown: ensures no recording outlives the session.
    pub fn shutdown(&mut self) {
        self.abort();
    }
}
