//! ffmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

use crate::error::{Error, Result};

/// Builder for ffmpeg invocations.
///
/// Arguments placed before `-i` (seek, format) go through `input_arg`;
/// everything after the input (codecs, filters, bitrate) through
/// `output_arg`. Output is always overwritten (`-y`) and ffmpeg's own
/// logging is held to errors only.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: PathBuf,
    output: Option<PathBuf>,
    input_args: Vec<String>,
    output_args: Vec<String>,
}

impl FfmpegCommand {
    /// Create a command reading from `input` and writing to `output`.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: Some(output.as_ref().to_path_buf()),
            input_args: Vec::new(),
            output_args: Vec::new(),
        }
    }

    /// Create a command that writes to stdout (`pipe:1`) instead of a file.
    pub fn to_stdout(input: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: None,
            input_args: Vec::new(),
            output_args: Vec::new(),
        }
    }

    /// Add an argument before `-i`.
    #[must_use]
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add an argument after the input file.
    #[must_use]
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple arguments after the input file.
    #[must_use]
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Seek to `seconds` before decoding (input-side seek).
    #[must_use]
    pub fn seek(self, seconds: f64) -> Self {
        self.input_arg("-ss").input_arg(format!("{seconds:.3}"))
    }

    /// Limit the read duration to `seconds`.
    #[must_use]
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{seconds:.3}"))
    }

    /// Set the video codec.
    #[must_use]
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set the audio codec.
    #[must_use]
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set the video bitrate target.
    #[must_use]
    pub fn video_bitrate(self, bitrate: impl Into<String>) -> Self {
        self.output_arg("-b:v").output_arg(bitrate)
    }

    /// Set the encode preset.
    #[must_use]
    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Assemble the full argument list.
    #[must_use]
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec!["-y".to_string(), "-v".to_string(), "error".to_string()];
        args.extend(self.input_args.clone());
        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());
        args.extend(self.output_args.clone());
        match &self.output {
            Some(path) => args.push(path.to_string_lossy().to_string()),
            None => args.push("pipe:1".to_string()),
        }
        args
    }

    /// Spawn the command with piped stdout and stderr, without waiting.
    pub fn spawn(&self) -> Result<std::process::Child> {
        let args = self.build_args();
        debug!("spawning: ffmpeg {}", args.join(" "));
        Ok(Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?)
    }
}

/// Run an ffmpeg command to completion.
///
/// `context` describes the operation for error reporting ("extracting audio",
/// "cutting segment 3", ...).
///
/// # Errors
///
/// Returns [`Error::FfmpegFailed`] with captured stderr when ffmpeg exits
/// non-zero.
pub fn run_ffmpeg(cmd: &FfmpegCommand, context: &str) -> Result<()> {
    let args = cmd.build_args();
    debug!("running: ffmpeg {}", args.join(" "));

    let output = Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()?;

    if output.status.success() {
        Ok(())
    } else {
        Err(Error::FfmpegFailed {
            context: context.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
