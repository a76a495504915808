//! External media tooling: ffprobe metadata and ffmpeg invocations.

mod audio;
mod command;
mod probe;

pub use audio::{TempAudio, extract_audio};
pub use command::{FfmpegCommand, run_ffmpeg};
pub use probe::{VideoInfo, probe_video};

use crate::error::{Error, Result};

/// Verify that ffmpeg and ffprobe are available on PATH.
pub fn ensure_tools() -> Result<()> {
    which::which("ffmpeg").map_err(|_| Error::ToolNotFound { tool: "ffmpeg" })?;
    which::which("ffprobe").map_err(|_| Error::ToolNotFound { tool: "ffprobe" })?;
    Ok(())
}
