//! Error types for reelcut.

/// Result type alias for reelcut operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for reelcut.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// A required external tool is not on PATH.
    #[error("required tool '{tool}' not found on PATH")]
    ToolNotFound {
        /// Name of the missing tool (ffmpeg or ffprobe).
        tool: &'static str,
    },

    /// Input video file does not exist.
    #[error("input video does not exist: {path}")]
    InputNotFound {
        /// Path to the missing input file.
        path: std::path::PathBuf,
    },

    /// Failed to probe video metadata.
    #[error("failed to probe '{path}': {message}")]
    Probe {
        /// Path to the video file.
        path: std::path::PathBuf,
        /// Description of the probe failure.
        message: String,
    },

    /// Container has no video stream.
    #[error("no video stream found in '{path}'")]
    NoVideoStream {
        /// Path to the video file.
        path: std::path::PathBuf,
    },

    /// Failed to open audio file.
    #[error("failed to open audio file '{path}'")]
    AudioOpen {
        /// Path to the audio file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to decode audio.
    #[error("failed to decode audio from '{path}'")]
    AudioDecode {
        /// Path to the audio file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No audio tracks found in the extracted waveform.
    #[error("no audio tracks found in '{path}'")]
    NoAudioTracks {
        /// Path to the audio file.
        path: std::path::PathBuf,
    },

    /// Failed to decode video frames.
    #[error("failed to decode video frames from '{path}': {message}")]
    VideoDecode {
        /// Path to the video file.
        path: std::path::PathBuf,
        /// Description of the decode failure.
        message: String,
    },

    /// An ffmpeg invocation failed.
    #[error("ffmpeg failed while {context}: {stderr}")]
    FfmpegFailed {
        /// What the invocation was doing.
        context: String,
        /// Captured stderr from ffmpeg.
        stderr: String,
    },

    /// No highlight timestamps were found in either signal source.
    #[error("no highlight moments detected; nothing to assemble")]
    NoHighlights,

    /// Failed to create the output directory.
    #[error("failed to create output directory '{path}'")]
    OutputDirCreate {
        /// Path to the output directory.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The run was cancelled by the user.
    #[error("run cancelled")]
    Cancelled,

    /// A highlight run is already in progress.
    #[error("a highlight run is already in progress")]
    AlreadyRunning,

    /// Internal error (for unexpected failures).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}
