//! Background worker running the highlight pipeline.
//!
//! One worker thread runs the fixed stage sequence
//! extract audio → analyze audio → analyze motion → assemble,
//! reporting progress to the caller over an mpsc channel. Cancellation is
//! cooperative: a fire-once token is checked between stages. A terminal
//! interrupt also reaches the ffmpeg child of an in-flight stage, so a
//! stage error observed after the token trips is reported as cancellation
//! rather than failure.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use tracing::info;

use crate::analysis::{
    MotionSettings, OnsetDetector, PeakPicking, decode_waveform, detect_motion, merge_timestamps,
};
use crate::assemble::{AssembleSettings, SegmentAssembler};
use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::media;

/// Fire-once cancellation token shared between the caller and the worker.
///
/// The flag only ever transitions false → true; single writer, single
/// reader, checked at stage boundaries only.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create an untripped token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Events emitted by the worker, in order.
#[derive(Debug)]
pub enum WorkerEvent {
    /// Human-readable stage status.
    Status(String),
    /// The run completed; the output file exists.
    Finished {
        /// Path to the produced highlight file.
        output: PathBuf,
        /// Counts gathered during the run.
        summary: RunSummary,
    },
    /// The run failed with the given error.
    Failed(Error),
    /// The run was cancelled; no output was produced.
    Cancelled,
}

/// Counts gathered during a completed run.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    /// Number of audio onset timestamps.
    pub audio_onsets: usize,
    /// Number of motion event timestamps (after burst collapsing).
    pub motion_events: usize,
    /// Number of merged highlight timestamps.
    pub merged: usize,
}

/// Everything a single run needs.
#[derive(Debug, Clone)]
pub struct HighlightJob {
    /// Source video path.
    pub video: PathBuf,
    /// Output directory (created if missing).
    pub output_dir: PathBuf,
    /// Name of the produced file inside the output directory.
    pub output_file_name: String,
    /// Signal analysis settings.
    pub analysis: AnalysisConfig,
    /// Encoder and window settings.
    pub assemble: AssembleSettings,
    /// Keep the intermediate extracted waveform after the run.
    pub keep_temp_audio: bool,
}

/// Handle to a spawned worker.
///
/// Owns the worker thread; dropping the handle without joining detaches the
/// thread, so callers should drain events and call [`WorkerHandle::join`].
#[derive(Debug)]
pub struct WorkerHandle {
    events: Receiver<WorkerEvent>,
    thread: std::thread::JoinHandle<()>,
}

impl WorkerHandle {
    /// Receiver for worker events.
    #[must_use]
    pub fn events(&self) -> &Receiver<WorkerEvent> {
        &self.events
    }

    /// Wait for the worker thread to finish.
    pub fn join(self) -> Result<()> {
        self.thread.join().map_err(|_| Error::Internal {
            message: "worker thread panicked".to_string(),
        })
    }
}

/// Spawns highlight runs and enforces the exclusive-run invariant.
///
/// A second [`Orchestrator::spawn`] while a run is active returns
/// [`Error::AlreadyRunning`]; the guard lives in the orchestrator, not in
/// whatever presentation layer sits on top.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    running: Arc<AtomicBool>,
}

impl Orchestrator {
    /// Create an idle orchestrator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a run is currently active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start a run on a background thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyRunning`] when a previous run has not
    /// finished, and [`Error::Io`] if the thread cannot be spawned.
    pub fn spawn(&self, job: HighlightJob, cancel: CancelToken) -> Result<WorkerHandle> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::AlreadyRunning);
        }

        let running = Arc::clone(&self.running);
        let (tx, rx) = std::sync::mpsc::channel();

        let thread = std::thread::Builder::new()
            .name("reelcut-worker".to_string())
            .spawn(move || {
                let _guard = RunGuard(running);
                let result = run_pipeline(&job, &tx, &cancel);
                let _ = tx.send(terminal_event(result, &cancel));
            })?;

        Ok(WorkerHandle { events: rx, thread })
    }
}

/// Clears the running flag when the worker exits, on every path.
struct RunGuard(Arc<AtomicBool>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Map the pipeline result to the terminal event for the run.
///
/// A completed run stays completed even if the token tripped after the last
/// stage. A stage error with the token tripped is the interrupt surfacing
/// through a killed ffmpeg child, not an independent failure; the failed
/// stage has already cleaned up any partial output.
fn terminal_event(result: Result<(PathBuf, RunSummary)>, cancel: &CancelToken) -> WorkerEvent {
    match result {
        Ok((output, summary)) => WorkerEvent::Finished { output, summary },
        Err(Error::Cancelled) => WorkerEvent::Cancelled,
        Err(_) if cancel.is_cancelled() => WorkerEvent::Cancelled,
        Err(e) => WorkerEvent::Failed(e),
    }
}

fn status(tx: &Sender<WorkerEvent>, message: impl Into<String>) {
    let message = message.into();
    info!("{message}");
    let _ = tx.send(WorkerEvent::Status(message));
}

fn checkpoint(cancel: &CancelToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}

/// Run the fixed stage sequence, returning the output path and counts.
fn run_pipeline(
    job: &HighlightJob,
    tx: &Sender<WorkerEvent>,
    cancel: &CancelToken,
) -> Result<(PathBuf, RunSummary)> {
    checkpoint(cancel)?;

    media::ensure_tools()?;
    std::fs::create_dir_all(&job.output_dir).map_err(|e| Error::OutputDirCreate {
        path: job.output_dir.clone(),
        source: e,
    })?;
    let info = media::probe_video(&job.video)?;

    status(tx, "extracting audio from video...");
    let temp_audio = if info.has_audio {
        Some(media::extract_audio(
            &job.video,
            &job.output_dir,
            job.keep_temp_audio,
        )?)
    } else {
        // A silent source simply contributes no onset timestamps.
        None
    };
    checkpoint(cancel)?;

    status(tx, "analyzing audio for significant moments...");
    let audio_onsets = match &temp_audio {
        Some(audio) => {
            let waveform = decode_waveform(audio.path())?;
            let picking = PeakPicking {
                delta: job.analysis.onset_delta,
                wait: job.analysis.onset_wait,
                ..PeakPicking::default()
            };
            OnsetDetector::new(picking).detect(&waveform)
        }
        None => Vec::new(),
    };
    checkpoint(cancel)?;

    status(tx, "analyzing motion in the video...");
    let motion_events = detect_motion(&job.video, &info, &MotionSettings::from(&job.analysis))?;
    checkpoint(cancel)?;

    let merged = merge_timestamps(&audio_onsets, &motion_events);
    status(tx, format!("found {} highlight moments", merged.len()));

    status(tx, "generating highlight video...");
    let output = job.output_dir.join(&job.output_file_name);
    SegmentAssembler::new(job.assemble.clone()).assemble(&job.video, &info, &merged, &output)?;

    // No checkpoint after assembly: the output exists, the run is done.
    status(tx, "done");
    Ok((
        output,
        RunSummary {
            audio_onsets: audio_onsets.len(),
            motion_events: motion_events.len(),
            merged: merged.len(),
        },
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Quality;

    fn job(dir: &std::path::Path) -> HighlightJob {
        HighlightJob {
            video: dir.join("input.mp4"),
            output_dir: dir.join("out"),
            output_file_name: "highlight.mp4".to_string(),
            analysis: AnalysisConfig::default(),
            assemble: AssembleSettings {
                quality: Quality::Medium,
                preset: "medium".to_string(),
                lead_secs: 2.0,
                trail_secs: 5.0,
            },
            keep_temp_audio: false,
        }
    }

    #[test]
    fn test_cancel_token_fires_once() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
        // Cancelling again is harmless; the flag is monotonic.
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_pre_cancelled_run_produces_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(dir.path());
        let output = job.output_dir.join(&job.output_file_name);

        let cancel = CancelToken::new();
        cancel.cancel();

        let orchestrator = Orchestrator::new();
        let handle = orchestrator.spawn(job, cancel).unwrap();

        let mut saw_cancelled = false;
        for event in handle.events() {
            match event {
                WorkerEvent::Cancelled => saw_cancelled = true,
                WorkerEvent::Finished { .. } | WorkerEvent::Failed(_) => {
                    panic!("expected cancellation, got {event:?}")
                }
                WorkerEvent::Status(_) => {}
            }
        }
        handle.join().unwrap();

        assert!(saw_cancelled);
        assert!(!output.exists());
    }

    #[test]
    fn test_stage_error_after_cancel_reports_cancelled() {
        // An interrupt kills the in-flight ffmpeg child as well; the
        // resulting stage error must surface as cancellation.
        let cancel = CancelToken::new();
        cancel.cancel();
        let result: Result<(PathBuf, RunSummary)> = Err(Error::FfmpegFailed {
            context: "cutting segment 0".to_string(),
            stderr: "Exiting normally, received signal 2.".to_string(),
        });
        assert!(matches!(
            terminal_event(result, &cancel),
            WorkerEvent::Cancelled
        ));
    }

    #[test]
    fn test_stage_error_without_cancel_reports_failure() {
        let cancel = CancelToken::new();
        let result: Result<(PathBuf, RunSummary)> = Err(Error::NoHighlights);
        assert!(matches!(
            terminal_event(result, &cancel),
            WorkerEvent::Failed(Error::NoHighlights)
        ));
    }

    #[test]
    fn test_late_cancel_does_not_retract_finished_run() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = Ok((
            PathBuf::from("out/highlight.mp4"),
            RunSummary {
                audio_onsets: 1,
                motion_events: 2,
                merged: 3,
            },
        ));
        assert!(matches!(
            terminal_event(result, &cancel),
            WorkerEvent::Finished { .. }
        ));
    }

    #[test]
    fn test_exclusive_run_invariant() {
        let orchestrator = Orchestrator::new();
        // Simulate an active run by holding the flag ourselves.
        assert!(
            orchestrator
                .running
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
        );

        let dir = tempfile::tempdir().unwrap();
        let result = orchestrator.spawn(job(dir.path()), CancelToken::new());
        assert!(matches!(result, Err(Error::AlreadyRunning)));

        // Releasing the flag allows a new run.
        orchestrator.running.store(false, Ordering::SeqCst);
        let cancel = CancelToken::new();
        cancel.cancel();
        let handle = orchestrator.spawn(job(dir.path()), cancel).unwrap();
        handle.join().unwrap();
        assert!(!orchestrator.is_running());
    }
}
