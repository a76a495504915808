//! Video metadata via ffprobe.

use serde::Deserialize;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Metadata of a video source, queried read-only from the container.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    /// Duration in seconds.
    pub duration: f64,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Average frame rate.
    pub fps: f64,
    /// Whether the container carries an audio stream.
    pub has_audio: bool,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

/// Probe a video file for duration, dimensions and frame rate.
///
/// # Errors
///
/// Returns [`Error::InputNotFound`] for a missing file, [`Error::Probe`] when
/// ffprobe fails or emits unparsable JSON, and [`Error::NoVideoStream`] when
/// the container has no video track.
pub fn probe_video(path: &Path) -> Result<VideoInfo> {
    if !path.exists() {
        return Err(Error::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;

    if !output.status.success() {
        return Err(Error::Probe {
            path: path.to_path_buf(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let probe: FfprobeOutput =
        serde_json::from_slice(&output.stdout).map_err(|e| Error::Probe {
            path: path.to_path_buf(),
            message: format!("invalid ffprobe output: {e}"),
        })?;

    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| Error::NoVideoStream {
            path: path.to_path_buf(),
        })?;

    let duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let fps = resolve_fps(
        video_stream.avg_frame_rate.as_deref(),
        video_stream.r_frame_rate.as_deref(),
    );

    let has_audio = probe.streams.iter().any(|s| s.codec_type == "audio");

    Ok(VideoInfo {
        duration,
        width: video_stream.width.unwrap_or(0),
        height: video_stream.height.unwrap_or(0),
        fps,
        has_audio,
    })
}

/// Resolve a usable frame rate from the probed rate strings.
///
/// ffprobe reports `avg_frame_rate` as "0/0" or "0/1" for some containers;
/// a rate that parses to a non-positive value is as useless as one that does
/// not parse, so both fall through to the next candidate and finally to
/// 30 fps.
fn resolve_fps(avg: Option<&str>, real: Option<&str>) -> f64 {
    [avg, real]
        .into_iter()
        .flatten()
        .find_map(|r| parse_frame_rate(r).filter(|fps| *fps > 0.0))
        .unwrap_or(30.0)
}

/// Parse a frame rate string such as "30/1" or "29.97".
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
    }
    s.parse().ok()
}
