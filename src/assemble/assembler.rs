//! Sub-clip extraction and concatenation.

use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::assemble::HighlightWindow;
use crate::config::Quality;
use crate::error::{Error, Result};
use crate::media::{FfmpegCommand, VideoInfo, run_ffmpeg};

/// Encoder and window parameters for assembly.
#[derive(Debug, Clone)]
pub struct AssembleSettings {
    /// Quality selector (bitrate target).
    pub quality: Quality,
    /// x264 encode preset.
    pub preset: String,
    /// Seconds before each timestamp.
    pub lead_secs: f64,
    /// Seconds after each timestamp.
    pub trail_secs: f64,
}

/// Assembles highlight windows into a single output file.
///
/// Each window is cut from the source with an accurate (re-encoding) seek at
/// the requested bitrate and preset, then the segments are joined with the
/// ffmpeg concat demuxer via stream copy. Windows are cut independently and
/// never merged; overlapping windows duplicate frames in the output, and
/// segments appear in the order the timestamps are given.
#[derive(Debug)]
pub struct SegmentAssembler {
    settings: AssembleSettings,
}

impl SegmentAssembler {
    /// Create an assembler with the given settings.
    #[must_use]
    pub fn new(settings: AssembleSettings) -> Self {
        Self { settings }
    }

    /// Cut a window around every timestamp and concatenate into `output`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoHighlights`] for an empty timestamp list;
    /// concatenating zero clips is a configuration error, not an excuse for
    /// a zero-length file. A partially written output is removed when the
    /// final encode fails.
    pub fn assemble(
        &self,
        source: &Path,
        info: &VideoInfo,
        timestamps: &[f64],
        output: &Path,
    ) -> Result<()> {
        if timestamps.is_empty() {
            return Err(Error::NoHighlights);
        }

        let scratch = tempfile::Builder::new()
            .prefix("reelcut-segments-")
            .tempdir()?;

        let mut segments = Vec::with_capacity(timestamps.len());
        for (index, &t) in timestamps.iter().enumerate() {
            let window = HighlightWindow::around(
                t,
                self.settings.lead_secs,
                self.settings.trail_secs,
                info.duration,
            );
            if window.length() <= 0.0 {
                warn!("skipping empty window for timestamp {t:.2}s");
                continue;
            }
            let segment = scratch.path().join(format!("seg_{index:04}.mp4"));
            self.cut_segment(source, info, window, index, &segment)?;
            segments.push(segment);
        }

        if segments.is_empty() {
            return Err(Error::NoHighlights);
        }

        let list_path = scratch.path().join("segments.txt");
        write_concat_list(&list_path, &segments)?;

        info!(
            "concatenating {} segments into {}",
            segments.len(),
            output.display()
        );
        let concat = FfmpegCommand::new(&list_path, output)
            .input_arg("-f")
            .input_arg("concat")
            .input_arg("-safe")
            .input_arg("0")
            .output_arg("-c")
            .output_arg("copy");
        if let Err(e) = run_ffmpeg(&concat, "concatenating segments") {
            // Do not leave a truncated highlight file behind.
            if output.exists() {
                let _ = std::fs::remove_file(output);
            }
            return Err(e);
        }

        Ok(())
    }

    /// Re-encode one window of the source into `segment`.
    fn cut_segment(
        &self,
        source: &Path,
        info: &VideoInfo,
        window: HighlightWindow,
        index: usize,
        segment: &Path,
    ) -> Result<()> {
        debug!(
            "segment {index}: {:.2}s - {:.2}s -> {}",
            window.start,
            window.end,
            segment.display()
        );

        let mut cmd = FfmpegCommand::new(source, segment)
            .seek(window.start)
            .duration(window.length())
            .video_codec("libx264")
            .preset(self.settings.preset.clone())
            .video_bitrate(self.settings.quality.bitrate());
        if info.has_audio {
            cmd = cmd.audio_codec("aac");
        } else {
            cmd = cmd.output_arg("-an");
        }

        run_ffmpeg(&cmd, &format!("cutting segment {index}"))
    }
}

/// Write an ffmpeg concat-demuxer list file.
fn write_concat_list(list_path: &Path, segments: &[PathBuf]) -> Result<()> {
    let mut file = std::fs::File::create(list_path)?;
    for segment in segments {
        // The concat demuxer expects single-quoted paths with quotes escaped.
        let escaped = segment.to_string_lossy().replace('\'', "'\\''");
        writeln!(file, "file '{escaped}'")?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn assembler() -> SegmentAssembler {
        SegmentAssembler::new(AssembleSettings {
            quality: Quality::Medium,
            preset: "medium".to_string(),
            lead_secs: 2.0,
            trail_secs: 5.0,
        })
    }

    fn info() -> VideoInfo {
        VideoInfo {
            duration: 30.0,
            width: 1280,
            height: 720,
            fps: 30.0,
            has_audio: true,
        }
    }

    #[test]
    fn test_empty_timestamps_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("highlight.mp4");
        let result = assembler().assemble(Path::new("input.mp4"), &info(), &[], &out);
        assert!(matches!(result, Err(Error::NoHighlights)));
        assert!(!out.exists());
    }

    #[test]
    fn test_concat_list_escaping() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("segments.txt");
        let segments = vec![
            PathBuf::from("/tmp/seg_0000.mp4"),
            PathBuf::from("/tmp/it's.mp4"),
        ];
        write_concat_list(&list, &segments).unwrap();

        let contents = std::fs::read_to_string(&list).unwrap();
        assert!(contents.contains("file '/tmp/seg_0000.mp4'"));
        assert!(contents.contains(r"file '/tmp/it'\''s.mp4'"));
    }
}
