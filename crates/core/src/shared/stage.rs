/// One ordered phase of a capture session.
///
/// `Ord` follows session order so artifact maps iterate
/// standard → wide → flash-reflection deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CaptureStage {
    Standard,
    Wide,
    FlashReflection,
}

impl std::fmt::Display for CaptureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureStage::Standard => write!(f, "standard"),
            CaptureStage::Wide => write!(f, "wide"),
            CaptureStage::FlashReflection => write!(f, "flash-reflection"),
        }
    }
}
