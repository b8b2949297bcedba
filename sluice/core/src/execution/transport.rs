//! Upload of artifacts to the remote SFTP directory

use std::sync::Arc;

use async_trait::async_trait;
use sluice_schemas::SftpTarget;
use sluice_sftp::{Connector, RemoteSession, Ssh2Connector};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{debug, instrument, warn};

use super::traits::Transport;
use crate::blocking::run_blocking;
use crate::model::{Artifact, ArtifactTransfer, TransferOutcome};

#[derive(Debug, Error)]
pub enum TransportError {
    /// No session could be established, or the session broke down mid-batch
    #[error("SFTP connection failed: {0}")]
    Connection(#[source] sluice_sftp::Error),

    /// A single artifact could not be uploaded
    #[error("Upload of '{file_name}' failed: {source}")]
    Upload {
        file_name: String,
        #[source]
        source: sluice_sftp::Error,
    },

    #[error("Transfer task did not complete: {0}")]
    Interrupted(#[from] JoinError),
}

/// Uploads a batch over one session opened by `C`.
///
/// Artifacts are uploaded one at a time in the given order. The first failed upload ends
/// the batch.
#[derive(Debug)]
pub struct SftpTransport<C> {
    connector: Arc<C>,
    target: SftpTarget,
}

impl SftpTransport<Ssh2Connector> {
    pub fn from_target(target: SftpTarget) -> Self {
        Self::new(Ssh2Connector::new(target.clone()), target)
    }
}

impl<C> SftpTransport<C>
where
    C: Connector + 'static,
{
    pub fn new(connector: C, target: SftpTarget) -> Self {
        Self {
            connector: Arc::new(connector),
            target,
        }
    }
}

#[async_trait]
impl<C> Transport for SftpTransport<C>
where
    C: Connector + 'static,
{
    #[instrument(skip_all, fields(host = %self.target.hostname, artifacts = artifacts.len()), err)]
    async fn transfer(
        &self,
        artifacts: &[Artifact],
    ) -> Result<Vec<ArtifactTransfer>, TransportError> {
        let connector = self.connector.clone();
        let batch = artifacts
            .iter()
            .map(|artifact| (artifact.clone(), self.target.remote_path(&artifact.file_name)))
            .collect::<Vec<_>>();

        run_blocking(move || upload_batch(connector.as_ref(), batch)).await?
    }
}

fn upload_batch<C: Connector>(
    connector: &C,
    batch: Vec<(Artifact, String)>,
) -> Result<Vec<ArtifactTransfer>, TransportError> {
    let mut session = connector.connect().map_err(TransportError::Connection)?;
    let mut transfers = Vec::with_capacity(batch.len());

    for (artifact, remote_path) in batch {
        match session.upload(&artifact.local_path, &remote_path) {
            Ok(bytes) => {
                debug!("Uploaded {} ({bytes} bytes) to {remote_path}", artifact.file_name);

                transfers.push(ArtifactTransfer {
                    artifact,
                    remote_path,
                    outcome: TransferOutcome::Transferred { bytes },
                });
            }
            Err(e) if e.is_connection_failure() => {
                return Err(TransportError::Connection(e));
            }
            Err(e) => {
                warn!("Upload of {} failed, aborting batch", artifact.file_name);

                transfers.push(ArtifactTransfer {
                    artifact,
                    remote_path,
                    outcome: TransferOutcome::Failed(e),
                });
                break;
            }
        }
    }

    Ok(transfers)
}
