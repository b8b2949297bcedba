//! Pipeline definition and execution
//!
//! - [`Pipeline`] wires one implementation of every stage trait together
//! - [`run_pipeline`] drives a single run through its states and returns the [`RunOutcome`](crate::RunOutcome)
//! - [`ProgressTracker`] receives typed events while a run is in progress

pub mod progress_tracker;
pub use progress_tracker::{LoggingProgressTracker, ProgressEvent, ProgressTracker, RunState};

pub mod run;
pub use run::{run_pipeline, Pipeline, PipelineBuilder};
