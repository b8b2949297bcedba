//! Pipeline execution logic

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use bon::Builder;
use sluice_schemas::{AcquisitionMode, RunConfiguration};
use tracing::{debug, error, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::execution::cleanup::{maybe_delete, CleanupAction};
use crate::execution::notify::{EmailNotifier, Notification};
use crate::execution::traits::{Acquirer, Notifier, Serializer, Transport};
use crate::execution::{
    CsvSerializer, DirectoryAcquirer, QueryAcquirer, SerializationError, SftpTransport,
    TransportError,
};
use crate::model::{Acquisition, Artifact, ArtifactTransfer, RunOutcome, TransferOutcome};
use crate::pipeline::progress_tracker::{ProgressEvent, ProgressTracker, RunState};

/// One implementation per stage plus the settings the orchestrator needs itself
#[derive(Builder)]
pub struct Pipeline {
    acquirer: Box<dyn Acquirer>,
    serializer: Box<dyn Serializer>,
    transport: Box<dyn Transport>,
    notifier: Box<dyn Notifier>,

    /// Destination of the serialized query result
    #[builder(into)]
    output_path: PathBuf,

    #[builder(default)]
    delete_after_transmit: bool,
}

impl Pipeline {
    /// Wire the production stages for `config`
    pub fn from_config(config: &RunConfiguration, output_path: impl Into<PathBuf>) -> Self {
        let (acquirer, include_header) = match &config.mode {
            AcquisitionMode::Directory { local_dir } => (
                Box::new(DirectoryAcquirer::new(local_dir.clone())) as Box<dyn Acquirer>,
                false,
            ),
            AcquisitionMode::Query(server) => (
                Box::new(QueryAcquirer::new(server.clone())) as Box<dyn Acquirer>,
                server.include_header,
            ),
        };

        debug!(
            "Pipeline in {} mode, delete_after_transmit={}, notification enabled={}",
            config.mode.name(),
            config.delete_after_transmit,
            config.notification_enabled()
        );

        Self {
            acquirer,
            serializer: Box::new(CsvSerializer::with_header(include_header)),
            transport: Box::new(SftpTransport::from_target(config.transfer.clone())),
            notifier: Box::new(EmailNotifier::new(config.email.clone())),
            output_path: output_path.into(),
            delete_after_transmit: config.delete_after_transmit,
        }
    }
}

/// Execute a single run of `pipeline` with optional progress tracking.
///
/// Stages run one after another. The first fatal error skips every remaining stage up
/// to the notification, which is attempted exactly once on every path. Cleanup and
/// notification failures are logged and never change the returned outcome.
pub async fn run_pipeline(
    pipeline: &Pipeline,
    progress_tracker: Option<Arc<dyn ProgressTracker>>,
) -> RunOutcome {
    let run_id = Uuid::new_v4();
    let span = info_span!("run", %run_id);

    async move {
        let tracker = Tracker(progress_tracker.as_deref());
        let start_time = Instant::now();

        tracker.emit(ProgressEvent::Started {
            run_id: run_id.to_string(),
        });

        let outcome = RunOutcome::from(execute(pipeline, &tracker).await);

        if let Some(cause) = outcome.cause() {
            error!("Run failed: {cause}");
        }

        tracker.emit(ProgressEvent::StageStarted {
            stage: RunState::Notifying,
        });

        match pipeline.notifier.notify(&outcome).await {
            Ok(Notification::Sent) => tracker.emit(ProgressEvent::Notified {
                success: outcome.is_success(),
            }),
            Ok(Notification::Disabled) => tracker.emit(ProgressEvent::NotificationSkipped),
            Err(e) => {
                warn!("Failed to send email notification: {e}");
                tracker.emit(ProgressEvent::NotificationSkipped);
            }
        }

        let total_duration = start_time.elapsed();
        debug!("Finished run ... Total time: {:.2?}", total_duration);

        tracker.emit(ProgressEvent::StageStarted {
            stage: RunState::Done,
        });
        tracker.emit(ProgressEvent::Completed {
            success: outcome.is_success(),
            duration_ms: total_duration.as_millis() as u64,
        });

        outcome
    }
    .instrument(span)
    .await
}

struct Tracker<'a>(Option<&'a dyn ProgressTracker>);

impl Tracker<'_> {
    fn emit(&self, event: ProgressEvent) {
        if let Some(tracker) = self.0 {
            tracker.on_progress(event);
        }
    }

    fn stage(&self, stage: RunState) {
        debug!("Entering stage {stage}");
        self.emit(ProgressEvent::StageStarted { stage });
    }
}

// stages up to and including cleanup, returns the first fatal error
async fn execute(pipeline: &Pipeline, tracker: &Tracker<'_>) -> Result<()> {
    tracker.stage(RunState::Acquiring);
    let time = Instant::now();

    let artifacts = match pipeline.acquirer.acquire().await? {
        Acquisition::Artifacts(artifacts) => artifacts,
        Acquisition::Rows(result) => {
            tracker.emit(ProgressEvent::RowsFetched {
                rows: result.rows.len(),
                columns: result.columns.len(),
            });

            tracker.stage(RunState::Serializing);
            vec![serialize(pipeline, result, tracker).await?]
        }
    };

    debug!("Acquired data ... Elapsed time: {:.2?}", time.elapsed());
    tracker.emit(ProgressEvent::ArtifactsReady {
        count: artifacts.len(),
    });

    if artifacts.is_empty() {
        warn!("No files to transfer ... skipping transfer");
        return Ok(());
    }

    tracker.stage(RunState::Transferring);
    let time = Instant::now();

    let transfers = pipeline.transport.transfer(&artifacts).await?;
    let mut confirmed = Vec::with_capacity(transfers.len());

    for ArtifactTransfer {
        artifact,
        remote_path,
        outcome,
    } in transfers
    {
        match outcome {
            TransferOutcome::Transferred { bytes } => {
                tracker.emit(ProgressEvent::FileTransferred {
                    local: artifact.local_path.clone(),
                    remote: remote_path,
                    bytes,
                });
                confirmed.push((artifact, TransferOutcome::Transferred { bytes }));
            }
            TransferOutcome::Failed(source) => {
                tracker.emit(ProgressEvent::FileFailed {
                    local: artifact.local_path.clone(),
                    remote: remote_path,
                });

                // a failed upload skips cleanup for the whole batch
                return Err(TransportError::Upload {
                    file_name: artifact.file_name,
                    source,
                }
                .into());
            }
        }
    }

    debug!("Finished transfer ... Elapsed time: {:.2?}", time.elapsed());

    tracker.stage(RunState::CleaningUp);

    for (artifact, outcome) in &confirmed {
        match maybe_delete(artifact, outcome, pipeline.delete_after_transmit) {
            Ok(CleanupAction::Deleted) => tracker.emit(ProgressEvent::FileDeleted {
                path: artifact.local_path.clone(),
            }),
            Ok(CleanupAction::Skipped | CleanupAction::AlreadyAbsent) => {}
            Err(e) => warn!("Cleanup failed, local file kept: {e}"),
        }
    }

    Ok(())
}

async fn serialize(
    pipeline: &Pipeline,
    result: sluice_odbc::QueryResult,
    tracker: &Tracker<'_>,
) -> Result<Artifact> {
    match pipeline
        .serializer
        .serialize(result, &pipeline.output_path)
        .await
    {
        Ok(artifact) => {
            tracker.emit(ProgressEvent::Serialized {
                path: artifact.local_path.clone(),
            });
            Ok(artifact)
        }
        Err(e) => {
            if !matches!(e, SerializationError::InvalidDestination(_)) {
                remove_partial(&pipeline.output_path);
            }
            Err(Error::from(e))
        }
    }
}

fn remove_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed partially written {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial file {}: {e}", path.display()),
    }
}
