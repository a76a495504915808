//! Configuration type definitions.

use crate::constants::{
    DEFAULT_LEAD_SECS, DEFAULT_MIN_CHANGED_PIXELS, DEFAULT_MIN_EVENT_GAP_SECS,
    DEFAULT_PIXEL_DIFF_THRESHOLD, DEFAULT_PRESET, DEFAULT_TRAIL_SECS, OUTPUT_FILE_NAME, bitrates,
    onset,
};
use serde::{Deserialize, Serialize};

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Signal analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Encoder settings.
    #[serde(default)]
    pub encode: EncodeConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Signal analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Per-pixel intensity difference (0-255) for a pixel to count as changed.
    pub pixel_diff_threshold: u8,

    /// Number of changed pixels required for a frame to count as motion.
    pub min_changed_pixels: u64,

    /// Minimum gap in seconds between retained motion timestamps.
    pub min_event_gap_secs: f64,

    /// Minimum onset prominence above the local envelope mean.
    pub onset_delta: f32,

    /// Minimum number of envelope frames between onset peaks.
    pub onset_wait: usize,

    /// Seconds included before each highlight timestamp.
    pub lead_secs: f64,

    /// Seconds included after each highlight timestamp.
    pub trail_secs: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pixel_diff_threshold: DEFAULT_PIXEL_DIFF_THRESHOLD,
            min_changed_pixels: DEFAULT_MIN_CHANGED_PIXELS,
            min_event_gap_secs: DEFAULT_MIN_EVENT_GAP_SECS,
            onset_delta: onset::DELTA,
            onset_wait: onset::WAIT,
            lead_secs: DEFAULT_LEAD_SECS,
            trail_secs: DEFAULT_TRAIL_SECS,
        }
    }
}

/// Encoder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    /// Default quality selector.
    pub quality: Quality,

    /// x264 encode preset.
    pub preset: String,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            quality: Quality::Medium,
            preset: DEFAULT_PRESET.to_string(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Name of the produced file inside the output directory.
    pub file_name: String,

    /// Keep the intermediate extracted waveform after the run.
    pub keep_temp_audio: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_name: OUTPUT_FILE_NAME.to_string(),
            keep_temp_audio: false,
        }
    }
}

/// Three-level quality selector mapped to an encoder bitrate target.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// 1000k target bitrate.
    Low,
    /// 3000k target bitrate.
    #[default]
    Medium,
    /// 6000k target bitrate.
    High,
}

impl Quality {
    /// The encoder bitrate target for this quality level.
    #[must_use]
    pub fn bitrate(self) -> &'static str {
        match self {
            Self::Low => bitrates::LOW,
            Self::Medium => bitrates::MEDIUM,
            Self::High => bitrates::HIGH,
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_bitrates() {
        assert_eq!(Quality::Low.bitrate(), "1000k");
        assert_eq!(Quality::Medium.bitrate(), "3000k");
        assert_eq!(Quality::High.bitrate(), "6000k");
    }

    #[test]
    fn test_quality_deserializes_lowercase() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            quality: Quality,
        }
        let parsed: Wrapper = toml::from_str(r#"quality = "high""#).unwrap();
        assert_eq!(parsed.quality, Quality::High);
        assert!(toml::from_str::<Wrapper>(r#"quality = "ultra""#).is_err());
    }

    #[test]
    fn test_analysis_defaults() {
        let analysis = AnalysisConfig::default();
        assert_eq!(analysis.pixel_diff_threshold, 30);
        assert_eq!(analysis.min_changed_pixels, 50_000);
        assert!((analysis.min_event_gap_secs - 1.0).abs() < f64::EPSILON);
        assert!((analysis.lead_secs - 2.0).abs() < f64::EPSILON);
        assert!((analysis.trail_secs - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).ok();
        assert!(toml.is_some());
    }
}
