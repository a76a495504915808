//! Waveform extraction from the video's audio track.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants::TEMP_AUDIO_FILE_NAME;
use crate::error::Result;
use crate::media::command::{FfmpegCommand, run_ffmpeg};

/// Guard for the intermediate extracted waveform.
///
/// Removes the file on drop (success, failure and cancellation alike)
/// unless `keep` was requested.
#[derive(Debug)]
pub struct TempAudio {
    path: PathBuf,
    keep: bool,
}

impl TempAudio {
    /// Path to the extracted waveform.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempAudio {
    fn drop(&mut self) {
        if self.keep || !self.path.exists() {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("failed to remove temp audio {}: {e}", self.path.display());
        }
    }
}

/// Extract the audio track of `video` to `<output_dir>/temp_audio.wav` as
/// mono 16-bit PCM.
///
/// # Errors
///
/// Returns [`crate::Error::FfmpegFailed`] when the source cannot be decoded
/// or has no usable audio track.
pub fn extract_audio(video: &Path, output_dir: &Path, keep: bool) -> Result<TempAudio> {
    let path = output_dir.join(TEMP_AUDIO_FILE_NAME);
    debug!("extracting audio to {}", path.display());

    let cmd = FfmpegCommand::new(video, &path)
        .output_arg("-vn")
        .audio_codec("pcm_s16le")
        .output_arg("-ac")
        .output_arg("1");
    run_ffmpeg(&cmd, "extracting audio")?;

    Ok(TempAudio { path, keep })
}
