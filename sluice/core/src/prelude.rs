//! Prelude module that exports commonly used types and functions.
//!
//! This module provides a convenient way to import all the necessary
//! components with a single `use sluice_core::prelude::*;` statement.

// Core types
pub use crate::model::{Acquisition, Artifact, ArtifactTransfer, RunOutcome, TransferOutcome};
pub use crate::Error;

// Configuration
pub use crate::templating::{ConfigError, ConfigFormat, ConfigLoader};
pub use sluice_schemas::{AcquisitionMode, RunConfiguration};

// Progress tracking
pub use crate::pipeline::progress_tracker::{
    LoggingProgressTracker, ProgressEvent, ProgressTracker, RunState,
};

// Pipeline execution
pub use crate::pipeline::{run_pipeline, Pipeline};

// Stage implementations
pub use crate::execution::{
    maybe_delete, CleanupAction, CsvSerializer, DirectoryAcquirer, EmailNotifier, Notification,
    QueryAcquirer, SftpTransport,
};

// Trait definitions
pub use crate::execution::traits::{Acquirer, Notifier, Serializer, Transport};
