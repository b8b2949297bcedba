use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// States of a run, in the order they are entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Acquiring,
    /// Query mode only
    Serializing,
    Transferring,
    CleaningUp,
    Notifying,
    Done,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunState::Acquiring => "acquiring",
            RunState::Serializing => "serializing",
            RunState::Transferring => "transferring",
            RunState::CleaningUp => "cleaning up",
            RunState::Notifying => "notifying",
            RunState::Done => "done",
        };

        f.write_str(name)
    }
}

/// Progress events emitted during a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Run started
    Started {
        /// Identifier of the run, also recorded on the `run` span
        run_id: String,
    },
    /// The run entered a new state
    StageStarted { stage: RunState },
    /// The query returned its result set
    RowsFetched { rows: usize, columns: usize },
    /// Files ready for transfer
    ArtifactsReady { count: usize },
    /// The result set was written to local storage
    Serialized { path: PathBuf },
    /// A file reached the remote directory
    FileTransferred {
        local: PathBuf,
        remote: String,
        bytes: u64,
    },
    /// A file could not be uploaded
    FileFailed { local: PathBuf, remote: String },
    /// A transferred file was removed locally
    FileDeleted { path: PathBuf },
    /// The status email was delivered
    Notified { success: bool },
    /// No status email was sent
    NotificationSkipped,
    /// Run finished
    Completed {
        success: bool,
        /// Total duration of the run
        duration_ms: u64,
    },
}

/// A trait for handling progress events during a run
pub trait ProgressTracker: Send + Sync {
    /// Called when a progress event occurs during a run
    fn on_progress(&self, event: ProgressEvent);
}

/// Writes every event to the log
#[derive(Debug)]
pub struct LoggingProgressTracker;

impl ProgressTracker for LoggingProgressTracker {
    #[instrument(skip_all)]
    fn on_progress(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { run_id } => {
                info!("Run {run_id} started");
            }
            ProgressEvent::StageStarted { stage } => {
                info!("Stage: {stage}");
            }
            ProgressEvent::RowsFetched { rows, columns } => {
                info!("Query returned {rows} row(s) with {columns} column(s)");
            }
            ProgressEvent::ArtifactsReady { count } => {
                info!("{count} file(s) ready for transfer");
            }
            ProgressEvent::Serialized { path } => {
                info!("Query result written to {}", path.display());
            }
            ProgressEvent::FileTransferred {
                local,
                remote,
                bytes,
            } => {
                info!(
                    "Transferred {} to {remote} ({bytes} bytes)",
                    local.display()
                );
            }
            ProgressEvent::FileFailed { local, remote } => {
                warn!("Failed to transfer {} to {remote}", local.display());
            }
            ProgressEvent::FileDeleted { path } => {
                info!("Deleted local file {}", path.display());
            }
            ProgressEvent::Notified { success } => {
                let status = if success { "success" } else { "failure" };
                info!("Email notification sent ({status})");
            }
            ProgressEvent::NotificationSkipped => {
                info!("No email notification sent");
            }
            ProgressEvent::Completed {
                success,
                duration_ms,
            } => {
                let status = if success { "successfully" } else { "with errors" };
                info!(
                    "Run completed {status} (total time: {:.2}s)",
                    duration_ms as f64 / 1000.0
                );
            }
        }
    }
}
