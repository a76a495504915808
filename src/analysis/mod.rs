//! Highlight signal extraction: audio onsets, motion events, and merging.

mod decode;
mod merge;
mod motion;
mod onset;

pub use decode::{Waveform, decode_waveform};
pub use merge::merge_timestamps;
pub use motion::{MotionSettings, collapse_close, detect_motion};
pub use onset::{OnsetDetector, PeakPicking};
