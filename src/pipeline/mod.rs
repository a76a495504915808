//! Background pipeline orchestration.

mod progress;
mod worker;

pub use progress::percent_for_message;
pub use worker::{
    CancelToken, HighlightJob, Orchestrator, RunSummary, WorkerEvent, WorkerHandle,
};
