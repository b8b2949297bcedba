//! # Sluice Core
//!
//! Delivery pipeline for sluice: acquire data (files from a directory or the result of
//! a query), serialize query results to CSV, upload everything over one SFTP session,
//! optionally delete what was delivered and finally report the outcome by email.
//!
//! Each stage sits behind a trait in [`execution::traits`] so implementations can be
//! swapped, e.g. for tests. [`run_pipeline`] drives the stages of a [`Pipeline`] and
//! always produces exactly one [`RunOutcome`].
//!
//! ```no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use sluice_core::prelude::*;
//!
//! # async fn run() -> Result<(), ConfigError> {
//! let config = RunConfiguration::from_file("conf.toml", HashMap::new())?;
//! let pipeline = Pipeline::from_config(&config, "output.csv");
//!
//! let outcome = run_pipeline(&pipeline, Some(Arc::new(LoggingProgressTracker))).await;
//! assert!(outcome.is_success());
//! # Ok(())
//! # }
//! ```

mod blocking;

pub mod error;
pub mod execution;
pub mod model;
pub mod pipeline;
pub mod prelude;
pub mod templating;

pub use error::{Error, Result};
pub use model::{Acquisition, Artifact, ArtifactTransfer, RunOutcome, TransferOutcome};
pub use pipeline::{run_pipeline, Pipeline};
pub use templating::{ConfigError, ConfigFormat, ConfigLoader};
