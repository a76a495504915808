//! Reelcut - automatic video highlight generation CLI.
//!
//! This crate analyzes a video's audio onsets and frame-to-frame motion to
//! find highlight moments, then assembles them into a single clip.

#![warn(missing_docs)]

pub mod analysis;
pub mod assemble;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod media;
pub mod pipeline;

use assemble::AssembleSettings;
use clap::{CommandFactory, Parser};
use cli::{Cli, Command, ConfigAction, RunArgs};
use config::{Config, config_file_path, load_default_config, save_default_config};
use indicatif::{ProgressBar, ProgressStyle};
use pipeline::{
    CancelToken, HighlightJob, Orchestrator, WorkerEvent, percent_for_message,
};
use std::path::Path;
use tracing::{info, warn};

pub use error::{Error, Result};

/// Main entry point for the reelcut CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.run.verbose, cli.run.quiet);

    // Handle subcommands
    if let Some(Command::Config { action }) = cli.command {
        return handle_config_command(action);
    }

    let config = load_default_config()?;

    // Default: cut a highlight reel. Show help if no input was given.
    let Some(video) = cli.video else {
        Cli::command().print_help()?;
        return Ok(());
    };

    cut_highlights(&video, &cli.run, &config)
}

/// Run the highlight pipeline for one video with the given options.
fn cut_highlights(video: &Path, args: &RunArgs, config: &Config) -> Result<()> {
    // Resolve settings: CLI flags override config values.
    let mut analysis = config.analysis.clone();
    if let Some(v) = args.pixel_threshold {
        analysis.pixel_diff_threshold = v;
    }
    if let Some(v) = args.min_changed_pixels {
        analysis.min_changed_pixels = v;
    }
    if let Some(v) = args.min_event_gap {
        analysis.min_event_gap_secs = v;
    }
    if let Some(v) = args.lead {
        analysis.lead_secs = v;
    }
    if let Some(v) = args.trail {
        analysis.trail_secs = v;
    }
    if let Some(v) = args.onset_delta {
        analysis.onset_delta = v;
    }
    if let Some(v) = args.onset_wait {
        analysis.onset_wait = v;
    }

    let quality = args.quality.unwrap_or(config.encode.quality);
    let preset = args
        .preset
        .clone()
        .unwrap_or_else(|| config.encode.preset.clone());

    let job = HighlightJob {
        video: video.to_path_buf(),
        output_dir: args.output_dir.clone(),
        output_file_name: config.output.file_name.clone(),
        assemble: AssembleSettings {
            quality,
            preset,
            lead_secs: analysis.lead_secs,
            trail_secs: analysis.trail_secs,
        },
        analysis,
        keep_temp_audio: args.keep_temp_audio || config.output.keep_temp_audio,
    };

    info!(
        "cutting highlights from {} at {} quality",
        video.display(),
        quality
    );

    let cancel = CancelToken::new();
    {
        // First Ctrl+C requests a cooperative stop; second one force-exits.
        let cancel = cancel.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            if cancel.is_cancelled() {
                std::process::exit(130); // 128 + SIGINT(2)
            }
            cancel.cancel();
        }) {
            warn!("Failed to install Ctrl+C handler: {e}");
        }
    }

    let start = std::time::Instant::now();
    let handle = Orchestrator::new().spawn(job, cancel)?;

    let progress_enabled = !args.quiet && !args.no_progress;
    let bar = progress_enabled.then(make_progress_bar);

    let mut outcome: Result<()> = Ok(());
    for event in handle.events() {
        match event {
            WorkerEvent::Status(message) => {
                if let Some(bar) = &bar {
                    if let Some(percent) = percent_for_message(&message) {
                        bar.set_position(u64::from(percent));
                    }
                    bar.set_message(message);
                }
            }
            WorkerEvent::Finished { output, summary } => {
                if let Some(bar) = &bar {
                    bar.finish_with_message("Complete");
                }
                info!(
                    "Complete: {} audio onsets, {} motion events, {} highlight moments -> {} in {:.2}s",
                    summary.audio_onsets,
                    summary.motion_events,
                    summary.merged,
                    output.display(),
                    start.elapsed().as_secs_f64()
                );
            }
            WorkerEvent::Failed(e) => {
                if let Some(bar) = &bar {
                    bar.abandon_with_message("Failed");
                }
                outcome = Err(e);
            }
            WorkerEvent::Cancelled => {
                if let Some(bar) = &bar {
                    bar.abandon_with_message("Cancelled");
                }
                outcome = Err(Error::Cancelled);
            }
        }
    }
    handle.join()?;

    outcome
}

fn make_progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    let style = ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter_str = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    fmt().with_env_filter(filter).init();
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = config_file_path()?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let saved_path = save_default_config(&Config::default())?;
                println!("Created configuration file: {}", saved_path.display());
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config()?;
            println!("{config:#?}");
            Ok(())
        }
        ConfigAction::Path => {
            let path = config_file_path()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
