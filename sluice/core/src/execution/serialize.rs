//! Serialization of query results to a local delimited-text file

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sluice_formats::{write_csv, CsvOptions};
use sluice_odbc::QueryResult;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{debug, instrument};

use super::traits::Serializer;
use crate::blocking::run_blocking;
use crate::model::Artifact;

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: sluice_formats::Error,
    },

    #[error("Destination '{}' does not name a file", .0.display())]
    InvalidDestination(PathBuf),

    #[error("Serialization task did not complete: {0}")]
    Interrupted(#[from] JoinError),
}

/// Writes result sets as CSV
#[derive(Debug, Clone, Default)]
pub struct CsvSerializer {
    options: CsvOptions,
}

impl CsvSerializer {
    pub fn new(options: CsvOptions) -> Self {
        Self { options }
    }

    /// Comma separated, platform line endings, optional header
    pub fn with_header(has_header: bool) -> Self {
        Self::new(CsvOptions {
            has_header,
            ..Default::default()
        })
    }
}

#[async_trait]
impl Serializer for CsvSerializer {
    #[instrument(skip(self, result), fields(rows = result.rows.len()), err)]
    async fn serialize(
        &self,
        result: QueryResult,
        destination: &Path,
    ) -> Result<Artifact, SerializationError> {
        let artifact = Artifact::from_path(destination)
            .ok_or_else(|| SerializationError::InvalidDestination(destination.to_path_buf()))?;

        let path = artifact.local_path.clone();
        let options = self.options.clone();

        let written = run_blocking(move || {
            write_csv(&path, &result.columns, &result.rows, &options)
                .map_err(|source| SerializationError::Write { path, source })
        })
        .await??;

        debug!("Wrote {written} record(s) to {}", artifact.local_path.display());

        Ok(artifact)
    }
}
