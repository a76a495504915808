//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "reelcut";

/// Default per-pixel intensity difference (0-255) for a pixel to count as changed.
pub const DEFAULT_PIXEL_DIFF_THRESHOLD: u8 = 30;

/// Default number of changed pixels required for a frame to count as a motion event.
pub const DEFAULT_MIN_CHANGED_PIXELS: u64 = 50_000;

/// Default minimum gap in seconds between retained motion timestamps.
///
/// Motion bursts produce near-duplicate timestamps; the first event in a
/// burst wins and later events within this gap are dropped.
pub const DEFAULT_MIN_EVENT_GAP_SECS: f64 = 1.0;

/// Seconds of video included before each highlight timestamp.
pub const DEFAULT_LEAD_SECS: f64 = 2.0;

/// Seconds of video included after each highlight timestamp.
pub const DEFAULT_TRAIL_SECS: f64 = 5.0;

/// Default x264 encode preset.
pub const DEFAULT_PRESET: &str = "medium";

/// Name of the produced highlight file inside the output directory.
pub const OUTPUT_FILE_NAME: &str = "highlight.mp4";

/// Name of the intermediate extracted waveform inside the output directory.
pub const TEMP_AUDIO_FILE_NAME: &str = "temp_audio.wav";

/// Onset detection parameters.
///
/// The STFT geometry and peak-picking windows follow librosa's defaults for
/// `onset_strength` / `peak_pick`, which the original detection was tuned
/// against.
pub mod onset {
    /// STFT window size in samples.
    pub const N_FFT: usize = 2048;

    /// Hop length between STFT frames in samples.
    pub const HOP_LENGTH: usize = 512;

    /// Frames before a candidate that must not exceed it.
    pub const PRE_MAX: usize = 3;

    /// Frames after a candidate that must not exceed it.
    pub const POST_MAX: usize = 3;

    /// Frames before a candidate included in the local mean.
    pub const PRE_AVG: usize = 3;

    /// Frames after a candidate included in the local mean.
    pub const POST_AVG: usize = 5;

    /// Minimum prominence above the local mean (on a peak-normalized envelope).
    pub const DELTA: f32 = 0.5;

    /// Minimum number of frames between consecutive peaks.
    pub const WAIT: usize = 10;
}

/// Quality selector to encoder bitrate mapping.
pub mod bitrates {
    /// Low quality target bitrate.
    pub const LOW: &str = "1000k";
    /// Medium quality target bitrate.
    pub const MEDIUM: &str = "3000k";
    /// High quality target bitrate.
    pub const HIGH: &str = "6000k";
}

/// Substring-to-percentage milestones for mapping worker status messages to
/// coarse progress. Unmatched messages leave the percentage unchanged.
pub const PROGRESS_MILESTONES: &[(&str, u8)] = &[
    ("extracting audio", 10),
    ("analyzing audio", 35),
    ("analyzing motion", 60),
    ("found", 70),
    ("generating", 90),
    ("done", 100),
];
