//! Best-effort removal of transferred artifacts

use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::model::{Artifact, TransferOutcome};

#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("Failed to delete '{}': {source}", path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What cleanup did with an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupAction {
    Deleted,

    /// Deletion is disabled or the transfer was not confirmed
    Skipped,

    /// The file was already gone
    AlreadyAbsent,
}

/// Delete the local file of `artifact` if its transfer is confirmed and deletion is enabled.
///
/// A file that no longer exists is not an error, so calling this twice is harmless.
#[instrument(skip_all, fields(file = %artifact.file_name), err)]
pub fn maybe_delete(
    artifact: &Artifact,
    outcome: &TransferOutcome,
    delete_after_transmit: bool,
) -> Result<CleanupAction, CleanupError> {
    if !delete_after_transmit || !outcome.is_transferred() {
        return Ok(CleanupAction::Skipped);
    }

    match std::fs::remove_file(&artifact.local_path) {
        Ok(()) => Ok(CleanupAction::Deleted),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{} already removed", artifact.local_path.display());
            Ok(CleanupAction::AlreadyAbsent)
        }
        Err(source) => Err(CleanupError::Delete {
            path: artifact.local_path.clone(),
            source,
        }),
    }
}
