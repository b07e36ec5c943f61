use crossbeam_channel::Sender;

use crate::recording::domain::recorder_backend::{
    RecorderBackend, RecorderEvent, RecordingError, RecordingFormat, RecordingHandle,
};

/// Deterministic in-process recorder.
///
/// Emits a fixed number of synthetic chunks per attempt up front and
/// acknowledges `stop` immediately. Gives the CLI simulation and
/// integration tests real bytes to package without an encoder.
pub struct MemoryRecorder {
    events: Sender<RecorderEvent>,
    supported: Vec<RecordingFormat>,
    chunks_per_attempt: usize,
}

impl MemoryRecorder {
    pub fn new(events: Sender<RecorderEvent>, supported: Vec<RecordingFormat>) -> Self {
        Self {
            events,
            supported,
            chunks_per_attempt: 3,
        }
    }

    pub fn with_chunks_per_attempt(mut self, chunks: usize) -> Self {
        self.chunks_per_attempt = chunks;
        self
    }
}

impl RecorderBackend for MemoryRecorder {
    fn supports(&self, format: RecordingFormat) -> bool {
        self.supported.contains(&format)
    }

    fn start(
        &mut self,
        handle: RecordingHandle,
        format: RecordingFormat,
    ) -> Result<(), RecordingError> {
        for i in 0..self.chunks_per_attempt {
            let payload = format!("{}:{}:{}", format.mime_type(), handle, i).into_bytes();
            self.events
                .send(RecorderEvent::Chunk {
                    handle,
                    data: payload,
                })
                .map_err(|e| RecordingError::StartFailed(e.to_string()))?;
        }
        Ok(())
    }

    fn stop(&mut self, handle: RecordingHandle) {
        // Channel closure during teardown is not an error.
        let _ = self.events.send(RecorderEvent::Stopped { handle });
    }
}
