//! Motion event detection via frame differencing.
//!
//! Frames are decoded to single-channel intensity through an ffmpeg
//! rawvideo pipe and compared pairwise: a frame whose absolute difference
//! from its predecessor exceeds the per-pixel threshold on enough pixels is
//! recorded as a motion event at `frame_index / fps`.

use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::media::{FfmpegCommand, VideoInfo};

/// Thresholds for the frame-difference pass.
#[derive(Debug, Clone, Copy)]
pub struct MotionSettings {
    /// Per-pixel intensity difference (0-255) for a pixel to count as changed.
    pub pixel_diff_threshold: u8,
    /// Number of changed pixels required for a frame to count as motion.
    pub min_changed_pixels: u64,
    /// Minimum gap in seconds between retained timestamps.
    pub min_event_gap_secs: f64,
}

impl From<&AnalysisConfig> for MotionSettings {
    fn from(cfg: &AnalysisConfig) -> Self {
        Self {
            pixel_diff_threshold: cfg.pixel_diff_threshold,
            min_changed_pixels: cfg.min_changed_pixels,
            min_event_gap_secs: cfg.min_event_gap_secs,
        }
    }
}

/// Detect motion event timestamps in `video`.
///
/// Returns ascending timestamps with bursts already collapsed: the first
/// event of a burst wins and later events within `min_event_gap_secs` of the
/// last retained one are dropped. A video with zero or one frame yields an
/// empty sequence.
pub fn detect_motion(
    video: &Path,
    info: &VideoInfo,
    settings: &MotionSettings,
) -> Result<Vec<f64>> {
    let frame_len = info.width as usize * info.height as usize;
    if frame_len == 0 {
        return Err(Error::VideoDecode {
            path: video.to_path_buf(),
            message: "zero-sized frames".to_string(),
        });
    }

    let cmd = FfmpegCommand::to_stdout(video)
        .output_arg("-f")
        .output_arg("rawvideo")
        .output_arg("-pix_fmt")
        .output_arg("gray");
    let mut child = cmd.spawn()?;

    let mut stdout = child.stdout.take().ok_or_else(|| Error::Internal {
        message: "ffmpeg stdout not captured".to_string(),
    })?;

    let mut prev = vec![0_u8; frame_len];
    let mut cur = vec![0_u8; frame_len];
    let mut raw_times = Vec::new();
    let mut have_prev = false;
    // Index of the frame being compared against its predecessor; the first
    // comparison is recorded at t = 0 to match the source detection.
    let mut compared: u64 = 0;

    loop {
        match read_frame(&mut stdout, &mut cur) {
            FrameRead::Full => {}
            FrameRead::Eof => break,
            FrameRead::Error(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::VideoDecode {
                    path: video.to_path_buf(),
                    message: e.to_string(),
                });
            }
        }

        if have_prev {
            let changed = changed_pixels(&prev, &cur, settings.pixel_diff_threshold);
            if changed > settings.min_changed_pixels {
                #[allow(clippy::cast_precision_loss)]
                raw_times.push(compared as f64 / info.fps);
            }
            compared += 1;
        } else {
            have_prev = true;
        }

        std::mem::swap(&mut prev, &mut cur);
    }

    let status = child.wait()?;
    if !status.success() {
        let mut stderr = String::new();
        if let Some(mut pipe) = child.stderr.take() {
            let _ = pipe.read_to_string(&mut stderr);
        }
        return Err(Error::VideoDecode {
            path: video.to_path_buf(),
            message: stderr.trim().to_string(),
        });
    }

    debug!("{} raw motion frames before collapsing", raw_times.len());
    Ok(collapse_close(&raw_times, settings.min_event_gap_secs))
}

enum FrameRead {
    Full,
    Eof,
    Error(std::io::Error),
}

/// Read exactly one frame; a clean EOF at a frame boundary ends the stream.
/// A partial trailing frame is treated as EOF as well (ffmpeg was killed or
/// the stream was truncated; the frames read so far still stand).
fn read_frame(reader: &mut impl Read, buf: &mut [u8]) -> FrameRead {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return FrameRead::Eof,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return FrameRead::Error(e),
        }
    }
    FrameRead::Full
}

/// Count pixels whose absolute intensity difference exceeds `threshold`.
fn changed_pixels(prev: &[u8], cur: &[u8], threshold: u8) -> u64 {
    prev.iter()
        .zip(cur.iter())
        .filter(|&(&p, &c)| p.abs_diff(c) > threshold)
        .count() as u64
}

/// Greedy forward collapse: keep the first timestamp of a burst, drop every
/// later one within `gap` seconds of the last retained timestamp.
///
/// Input must be ascending; output is ascending.
#[must_use]
pub fn collapse_close(times: &[f64], gap: f64) -> Vec<f64> {
    let mut filtered: Vec<f64> = Vec::new();
    for &t in times {
        match filtered.last() {
            Some(&last) if t - last <= gap => {}
            _ => filtered.push(t),
        }
    }
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_close_burst() {
        let raw = [1.0, 1.2, 1.5, 3.0];
        assert_eq!(collapse_close(&raw, 1.0), vec![1.0, 3.0]);
    }

    #[test]
    fn test_collapse_close_single_burst() {
        let raw = [5.0, 5.4, 5.9];
        assert_eq!(collapse_close(&raw, 1.0), vec![5.0]);
    }

    #[test]
    fn test_collapse_close_empty() {
        assert!(collapse_close(&[], 1.0).is_empty());
    }

    #[test]
    fn test_collapse_close_all_spread() {
        let raw = [0.0, 2.0, 4.0];
        assert_eq!(collapse_close(&raw, 1.0), raw.to_vec());
    }

    #[test]
    fn test_changed_pixels_threshold_is_strict() {
        let prev = [0_u8, 0, 0, 0];
        let cur = [30_u8, 31, 100, 0];
        // Exactly-threshold differences do not count.
        assert_eq!(changed_pixels(&prev, &cur, 30), 2);
    }
}
