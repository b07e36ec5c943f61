use serde::{Deserialize, Serialize};

use crate::shared::stage::CaptureStage;

/// Session mode selected before capture starts.
///
/// Two independent axes hang off the mode: which region profile the
/// standard stage uses (`MsbFlash` shrinks it) and which stage list the
/// session runs (both flash variants append a flash-reflection stage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    NoFlash,
    Red,
    Orange,
    VibFlash,
    MsbFlash,
}

impl CaptureMode {
    pub const ALL: &[CaptureMode] = &[
        CaptureMode::NoFlash,
        CaptureMode::Red,
        CaptureMode::Orange,
        CaptureMode::VibFlash,
        CaptureMode::MsbFlash,
    ];

    /// Label used in artifact file names.
    pub fn label(&self) -> &'static str {
        match self {
            CaptureMode::NoFlash => "noflash",
            CaptureMode::Red => "red",
            CaptureMode::Orange => "orange",
            CaptureMode::VibFlash => "VIB_Flash",
            CaptureMode::MsbFlash => "MSB_Flash",
        }
    }

    /// The two solid-flash variants add a third capture stage and keep
    /// the flash overlay lit for its whole countdown.
    pub fn is_flash_variant(&self) -> bool {
        matches!(self, CaptureMode::VibFlash | CaptureMode::MsbFlash)
    }

    /// Whether the flash overlay blinks during any countdown.
    pub fn blinks(&self) -> bool {
        matches!(self, CaptureMode::Red | CaptureMode::Orange)
    }

    /// Whether the standard stage uses the compact region profile.
    pub fn uses_compact_region(&self) -> bool {
        matches!(self, CaptureMode::MsbFlash)
    }

    /// Stages this mode runs, strictly in order, never revisited.
    pub fn stage_sequence(&self) -> &'static [CaptureStage] {
        if self.is_flash_variant() {
            &[
                CaptureStage::Standard,
                CaptureStage::Wide,
                CaptureStage::FlashReflection,
            ]
        } else {
            &[CaptureStage::Standard, CaptureStage::Wide]
        }
    }
}

impl std::fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for CaptureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "noflash" | "none" => Ok(CaptureMode::NoFlash),
            "red" => Ok(CaptureMode::Red),
            "orange" => Ok(CaptureMode::Orange),
            "vib_flash" | "vib-flash" => Ok(CaptureMode::VibFlash),
            "msb_flash" | "msb-flash" => Ok(CaptureMode::MsbFlash),
            other => Err(format!(
                "unknown mode '{other}', expected one of: noflash, red, orange, vib_flash, msb_flash"
            )),
        }
    }
}
