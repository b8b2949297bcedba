//! Values passed between pipeline stages

use std::path::{Path, PathBuf};

use sluice_odbc::QueryResult;

use crate::error::Error;

/// A local file representing one unit of transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Location of the file on local storage
    pub local_path: PathBuf,

    /// Base name used for the remote destination
    pub file_name: String,
}

impl Artifact {
    /// Build an artifact for `path`, `None` if the path has no file name (e.g. `..` or `/`)
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let local_path = path.into();
        let file_name = local_path.file_name()?.to_string_lossy().into_owned();

        Some(Self {
            local_path,
            file_name,
        })
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }
}

/// What the acquisition stage produced
#[derive(Debug)]
pub enum Acquisition {
    /// Files that are already serialized (directory mode)
    Artifacts(Vec<Artifact>),

    /// A result set that still needs serializing (query mode)
    Rows(QueryResult),
}

/// Result of uploading a single artifact
#[derive(Debug)]
pub enum TransferOutcome {
    Transferred { bytes: u64 },
    Failed(sluice_sftp::Error),
}

impl TransferOutcome {
    pub fn is_transferred(&self) -> bool {
        matches!(self, TransferOutcome::Transferred { .. })
    }
}

/// An artifact together with where it was sent and how that went
#[derive(Debug)]
pub struct ArtifactTransfer {
    pub artifact: Artifact,
    pub remote_path: String,
    pub outcome: TransferOutcome,
}

/// The single summary of a run
#[derive(Debug)]
pub enum RunOutcome {
    Success,

    /// The first fatal error of the run
    Failure(Error),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success)
    }

    pub fn cause(&self) -> Option<&Error> {
        match self {
            RunOutcome::Success => None,
            RunOutcome::Failure(error) => Some(error),
        }
    }
}

impl From<crate::Result<()>> for RunOutcome {
    fn from(result: crate::Result<()>) -> Self {
        match result {
            Ok(()) => RunOutcome::Success,
            Err(error) => RunOutcome::Failure(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_from_path() {
        let artifact = Artifact::from_path("/data/outbox/report.csv").unwrap();

        assert_eq!(artifact.file_name, "report.csv");
        assert_eq!(artifact.local_path(), Path::new("/data/outbox/report.csv"));
        assert!(Artifact::from_path("/").is_none());
    }
}
