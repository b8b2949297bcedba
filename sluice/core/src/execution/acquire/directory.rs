use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::AcquisitionError;
use crate::blocking::run_blocking;
use crate::execution::traits::Acquirer;
use crate::model::{Acquisition, Artifact};

/// Lazy, restartable view of the regular files in a directory.
///
/// Nothing touches the file system until [`DirectoryListing::iter`] is called and every
/// call lists the directory again, so a listing can be consumed any number of times.
/// The listing is not recursive; subdirectories and other non-file entries are skipped.
/// Symbolic links are followed.
#[derive(Debug, Clone)]
pub struct DirectoryListing {
    path: PathBuf,
}

impl DirectoryListing {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start a new pass over the directory
    pub fn iter(&self) -> io::Result<impl Iterator<Item = io::Result<Artifact>>> {
        let entries = fs::read_dir(&self.path)?;

        Ok(entries.filter_map(|entry| {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => return Some(Err(e)),
            };

            // metadata follows symlinks, dangling links fail and are skipped
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => Artifact::from_path(path).map(Ok),
                _ => None,
            }
        }))
    }

    /// List the directory once, ordered by file name
    pub fn collect_sorted(&self) -> io::Result<Vec<Artifact>> {
        let mut artifacts = self.iter()?.collect::<io::Result<Vec<_>>>()?;
        artifacts.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        Ok(artifacts)
    }
}

/// Acquires the files that are already present in a local directory
#[derive(Debug, Clone)]
pub struct DirectoryAcquirer {
    listing: DirectoryListing,
}

impl DirectoryAcquirer {
    pub fn new(local_dir: impl Into<PathBuf>) -> Self {
        Self {
            listing: DirectoryListing::new(local_dir),
        }
    }
}

#[async_trait]
impl Acquirer for DirectoryAcquirer {
    #[instrument(skip_all, fields(local_dir = %self.listing.path().display()), err)]
    async fn acquire(&self) -> Result<Acquisition, AcquisitionError> {
        let listing = self.listing.clone();

        let artifacts = run_blocking(move || listing.collect_sorted())
            .await?
            .map_err(|source| AcquisitionError::ListDirectory {
                path: self.listing.path().to_path_buf(),
                source,
            })?;

        debug!("Found {} file(s)", artifacts.len());

        Ok(Acquisition::Artifacts(artifacts))
    }
}
