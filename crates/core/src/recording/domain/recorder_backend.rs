use thiserror::Error;

/// Identifies one recording attempt. Handles are never reused within a
/// session, so late events from an abandoned attempt can be told apart
/// from the current one.
pub type RecordingHandle = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingFormat {
    Mp4,
    WebM,
}

impl RecordingFormat {
    /// Negotiation order: MP4 first, WebM as fallback.
    pub const PREFERRED: &'static [RecordingFormat] = &[RecordingFormat::Mp4, RecordingFormat::WebM];

    pub fn extension(&self) -> &'static str {
        match self {
            RecordingFormat::Mp4 => "mp4",
            RecordingFormat::WebM => "webm",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            RecordingFormat::Mp4 => "video/mp4",
            RecordingFormat::WebM => "video/webm",
        }
    }
}

impl std::fmt::Display for RecordingFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Events a backend emits on its channel. Ordering per handle is
/// chunks first, then exactly one `Stopped`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    Chunk {
        handle: RecordingHandle,
        data: Vec<u8>,
    },
    Stopped {
        handle: RecordingHandle,
    },
}

#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("no supported recording format")]
    NoSupportedFormat,
    #[error("recording format not negotiated")]
    FormatNotNegotiated,
    #[error("recorder failed to start: {0}")]
    StartFailed(String),
    #[error("failed to encode photo: {0}")]
    PhotoEncode(#[from] image::ImageError),
}

/// Domain interface for video encoders.
///
/// Backends run asynchronously: `start` returns immediately and data
/// arrives as `RecorderEvent`s on the channel handed to the backend at
/// construction. `stop` must eventually produce `Stopped` for the
/// handle, after any remaining chunks.
pub trait RecorderBackend: Send {
    fn supports(&self, format: RecordingFormat) -> bool;

    fn start(
        &mut self,
        handle: RecordingHandle,
        format: RecordingFormat,
    ) -> Result<(), RecordingError>;

    fn stop(&mut self, handle: RecordingHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_extensions() {
        assert_eq!(RecordingFormat::Mp4.extension(), "mp4");
        assert_eq!(RecordingFormat::WebM.extension(), "webm");
    }

    #[test]
    fn test_preference_order_is_mp4_then_webm() {
        assert_eq!(
            RecordingFormat::PREFERRED,
            &[RecordingFormat::Mp4, RecordingFormat::WebM]
        );
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(RecordingFormat::Mp4.mime_type(), "video/mp4");
        assert_eq!(RecordingFormat::WebM.mime_type(), "video/webm");
    }
}
