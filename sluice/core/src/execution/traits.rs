//! Trait definitions for the pipeline stages

use std::path::Path;

use async_trait::async_trait;
use sluice_odbc::QueryResult;

use super::acquire::AcquisitionError;
use super::notify::{Notification, NotificationError};
use super::serialize::SerializationError;
use super::transport::TransportError;
use crate::model::{Acquisition, Artifact, ArtifactTransfer, RunOutcome};

/// Produces the data for a run, either ready-made files or a result set
#[async_trait]
pub trait Acquirer: Send + Sync {
    /// Acquire the run's data. Called once per run
    async fn acquire(&self) -> Result<Acquisition, AcquisitionError>;
}

/// Writes a result set to local storage
#[async_trait]
pub trait Serializer: Send + Sync {
    /// Serialize `result` to `destination`, overwriting any existing file
    async fn serialize(
        &self,
        result: QueryResult,
        destination: &Path,
    ) -> Result<Artifact, SerializationError>;
}

/// Uploads a batch of artifacts over a single remote session
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transfer the artifacts in order.
    ///
    /// A connection level failure fails the whole batch. A failed upload is reported
    /// as the last entry of the returned list, the remaining artifacts are not attempted.
    async fn transfer(
        &self,
        artifacts: &[Artifact],
    ) -> Result<Vec<ArtifactTransfer>, TransportError>;
}

/// Reports the outcome of a run
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, outcome: &RunOutcome) -> Result<Notification, NotificationError>;
}
