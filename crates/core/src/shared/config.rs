use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Fixed session tuning, loaded once at startup.
///
/// Defaults match the reference capture deployment; every field can be
/// overridden from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Minimum detector confidence for a detection to count as a face.
    pub confidence_threshold: f64,
    /// Maximum horizontal distance (px) between face center and target center.
    pub max_offset_x: f64,
    /// Maximum vertical distance (px) between face center and target center.
    pub max_offset_y: f64,
    /// Minimum face-box area as a fraction of the oval area.
    pub min_fill_ratio: f64,
    /// Maximum face-box area as a fraction of the oval area.
    pub max_fill_ratio: f64,
    pub oval_width_ratio: f64,
    pub oval_height_ratio: f64,
    pub wide_oval_width_ratio: f64,
    pub wide_oval_height_ratio: f64,
    pub compact_oval_width_ratio: f64,
    pub compact_oval_height_ratio: f64,
    /// `center_y = canvas_height / divisor`; 2.0 is the geometric middle.
    pub oval_center_y_divisor: f64,
    /// Expected face center sits below the oval center by `height * ratio`.
    pub oval_offset_y_ratio: f64,
    /// Sustained-validity time required to finish a stage, in seconds.
    pub countdown_secs: f64,
    /// Blink period of the flash overlay, in seconds.
    pub flash_interval_secs: f64,
    /// How long the "keep your face in position" message lingers after a
    /// cancelled countdown, in seconds.
    pub settle_delay_secs: f64,
    /// Detection/evaluation ticks per second.
    pub target_fps: f64,
    /// JPEG quality for still photos (1-100).
    pub photo_quality: u8,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.8,
            max_offset_x: 25.0,
            max_offset_y: 30.0,
            min_fill_ratio: 0.85,
            max_fill_ratio: 1.1,
            oval_width_ratio: 0.5,
            oval_height_ratio: 0.6,
            wide_oval_width_ratio: 0.65,
            wide_oval_height_ratio: 0.75,
            compact_oval_width_ratio: 0.45,
            compact_oval_height_ratio: 0.55,
            oval_center_y_divisor: 2.0,
            oval_offset_y_ratio: 0.125,
            countdown_secs: 5.0,
            flash_interval_secs: 0.8,
            settle_delay_secs: 2.0,
            target_fps: 30.0,
            photo_quality: 95,
        }
    }
}

impl CaptureConfig {
    /// Loads a config from a JSON file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::Invalid(format!(
                "confidence_threshold must be between 0.0 and 1.0, got {}",
                self.confidence_threshold
            )));
        }
        if self.min_fill_ratio <= 0.0 || self.min_fill_ratio > self.max_fill_ratio {
            return Err(ConfigError::Invalid(format!(
                "fill ratios must satisfy 0 < min <= max, got {} and {}",
                self.min_fill_ratio, self.max_fill_ratio
            )));
        }
        if self.countdown_secs <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "countdown_secs must be positive, got {}",
                self.countdown_secs
            )));
        }
        if self.flash_interval_secs <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "flash_interval_secs must be positive, got {}",
                self.flash_interval_secs
            )));
        }
        if self.target_fps <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "target_fps must be positive, got {}",
                self.target_fps
            )));
        }
        if self.oval_center_y_divisor <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "oval_center_y_divisor must be positive, got {}",
                self.oval_center_y_divisor
            )));
        }
        if self.photo_quality == 0 || self.photo_quality > 100 {
            return Err(ConfigError::Invalid(format!(
                "photo_quality must be between 1 and 100, got {}",
                self.photo_quality
            )));
        }
        Ok(())
    }

    /// Pacing interval of the cooperative detection loop.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps)
    }

    pub fn countdown(&self) -> Duration {
        Duration::from_secs_f64(self.countdown_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs_f64(self.settle_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_match_reference_deployment() {
        let c = CaptureConfig::default();
        assert_relative_eq!(c.confidence_threshold, 0.8);
        assert_relative_eq!(c.max_offset_x, 25.0);
        assert_relative_eq!(c.max_offset_y, 30.0);
        assert_relative_eq!(c.min_fill_ratio, 0.85);
        assert_relative_eq!(c.max_fill_ratio, 1.1);
        assert_relative_eq!(c.oval_width_ratio, 0.5);
        assert_relative_eq!(c.oval_height_ratio, 0.6);
        assert_relative_eq!(c.countdown_secs, 5.0);
        assert_relative_eq!(c.flash_interval_secs, 0.8);
        assert_eq!(c.photo_quality, 95);
    }

    #[test]
    fn test_default_validates() {
        assert!(CaptureConfig::default().validate().is_ok());
    }

    #[test]
    fn test_frame_interval_at_30_fps() {
        let c = CaptureConfig::default();
        let interval = c.frame_interval();
        assert!((interval.as_secs_f64() - 1.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_confidence_rejected() {
        let c = CaptureConfig {
            confidence_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_inverted_fill_ratios_rejected() {
        let c = CaptureConfig {
            min_fill_ratio: 1.2,
            max_fill_ratio: 0.9,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_zero_countdown_rejected() {
        let c = CaptureConfig {
            countdown_secs: 0.0,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_zero_photo_quality_rejected() {
        let c = CaptureConfig {
            photo_quality: 0,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_load_partial_json_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "countdown_secs": 3.0 }"#).unwrap();

        let c = CaptureConfig::load(&path).unwrap();
        assert_relative_eq!(c.countdown_secs, 3.0);
        assert_relative_eq!(c.confidence_threshold, 0.8);
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let result = CaptureConfig::load(Path::new("/nonexistent/config.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            CaptureConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "target_fps": -1.0 }"#).unwrap();
        assert!(matches!(
            CaptureConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let c = CaptureConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let back: CaptureConfig = serde_json::from_str(&json).unwrap();
        assert_relative_eq!(back.max_offset_y, c.max_offset_y);
        assert_relative_eq!(back.oval_offset_y_ratio, c.oval_offset_y_ratio);
    }
}
