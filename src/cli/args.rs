//! CLI argument definitions.

use crate::config::Quality;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Cut a highlight reel from a video using audio onset and motion detection.
#[derive(Debug, Parser)]
#[command(name = "reelcut")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Input video file to analyze.
    pub video: Option<PathBuf>,

    /// Options for a highlight run.
    #[command(flatten)]
    pub run: RunArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for a highlight run.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Output directory for the highlight file and intermediates.
    #[arg(short, long, default_value = "output", env = "REELCUT_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Quality selector mapped to an encoder bitrate.
    #[arg(short, long, value_enum, env = "REELCUT_QUALITY")]
    pub quality: Option<Quality>,

    /// x264 encode preset (overrides config).
    #[arg(long, env = "REELCUT_PRESET")]
    pub preset: Option<String>,

    /// Per-pixel intensity difference (0-255) counting as change.
    #[arg(long)]
    pub pixel_threshold: Option<u8>,

    /// Changed pixels required for a frame to count as motion.
    #[arg(long)]
    pub min_changed_pixels: Option<u64>,

    /// Minimum seconds between retained motion events.
    #[arg(long, value_parser = parse_non_negative, allow_negative_numbers = true)]
    pub min_event_gap: Option<f64>,

    /// Seconds included before each highlight timestamp.
    #[arg(long, value_parser = parse_non_negative, allow_negative_numbers = true)]
    pub lead: Option<f64>,

    /// Seconds included after each highlight timestamp.
    #[arg(long, value_parser = parse_non_negative, allow_negative_numbers = true)]
    pub trail: Option<f64>,

    /// Minimum onset prominence (on the peak-normalized envelope).
    #[arg(long)]
    pub onset_delta: Option<f32>,

    /// Minimum envelope frames between onset peaks.
    #[arg(long)]
    pub onset_wait: Option<usize>,

    /// Keep the intermediate extracted waveform after the run.
    #[arg(long)]
    pub keep_temp_audio: bool,

    /// Suppress progress output.
    #[arg(long)]
    pub no_progress: bool,

    /// Only log warnings and errors.
    #[arg(short = 'Q', long)]
    pub quiet: bool,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse a non-negative seconds value.
fn parse_non_negative(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("invalid number: {s}"))?;
    if value < 0.0 {
        return Err(format!("must be non-negative, got {value}"));
    }
    Ok(value)
}
