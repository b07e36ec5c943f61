use std::f64::consts::PI;

use crate::shared::config::CaptureConfig;
use crate::shared::mode::CaptureMode;
use crate::shared::stage::CaptureStage;

/// The target elliptical capture zone with derived area thresholds.
///
/// Computed fresh on viewport resize, stage transition, and mode change;
/// never mutated in place. The expected face center sits
/// `target_offset_y` below the oval's geometric center.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRegion {
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
    pub target_offset_y: f64,
    pub min_area: f64,
    pub max_area: f64,
}

impl CaptureRegion {
    /// Derives the region for one stage of one mode on a given canvas.
    ///
    /// The wide and flash-reflection stages share the wider oval; the
    /// standard stage shrinks for the compact-flash mode. Pure function
    /// of its inputs.
    pub fn compute(
        canvas_width: f64,
        canvas_height: f64,
        stage: CaptureStage,
        mode: CaptureMode,
        config: &CaptureConfig,
    ) -> Self {
        let (width_ratio, height_ratio) = match stage {
            CaptureStage::Standard if mode.uses_compact_region() => (
                config.compact_oval_width_ratio,
                config.compact_oval_height_ratio,
            ),
            CaptureStage::Standard => (config.oval_width_ratio, config.oval_height_ratio),
            CaptureStage::Wide | CaptureStage::FlashReflection => (
                config.wide_oval_width_ratio,
                config.wide_oval_height_ratio,
            ),
        };

        let width = canvas_width * width_ratio;
        let height = canvas_height * height_ratio;
        let area = PI * (width / 2.0) * (height / 2.0);

        Self {
            center_x: canvas_width / 2.0,
            center_y: canvas_height / config.oval_center_y_divisor,
            width,
            height,
            target_offset_y: height * config.oval_offset_y_ratio,
            min_area: config.min_fill_ratio * area,
            max_area: config.max_fill_ratio * area,
        }
    }

    /// Vertical coordinate the face center is expected to sit at.
    pub fn target_center_y(&self) -> f64 {
        self.center_y + self.target_offset_y
    }

    /// Oval area in square pixels.
    pub fn area(&self) -> f64 {
        PI * (self.width / 2.0) * (self.height / 2.0)
    }
}
