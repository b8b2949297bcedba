//! Data acquisition, one variant per [`AcquisitionMode`](sluice_schemas::AcquisitionMode)

use std::path::PathBuf;

use thiserror::Error;
use tokio::task::JoinError;

mod directory;
mod query;

pub use directory::{DirectoryAcquirer, DirectoryListing};
pub use query::QueryAcquirer;

/// Errors raised while acquiring the data of a run
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("Failed to list directory '{}': {source}", path.display())]
    ListDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Query(#[from] sluice_odbc::Error),

    #[error("Acquisition task did not complete: {0}")]
    Interrupted(#[from] JoinError),
}
