use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sluice_core::prelude::*;
use tracing::{debug, info};

pub async fn run_local(
    file: &Path,
    params: HashMap<String, String>,
    output: PathBuf,
) -> Result<RunOutcome, ConfigError> {
    info!("Loading configuration from {}", file.display());

    let config = RunConfiguration::from_file(file, params)?;
    debug!(
        "Configuration valid: {} mode, notification enabled: {}",
        config.mode.name(),
        config.notification_enabled()
    );

    let pipeline = Pipeline::from_config(&config, output);
    let progress_tracker = Arc::new(LoggingProgressTracker);

    Ok(run_pipeline(&pipeline, Some(progress_tracker)).await)
}

/// Load the configuration and describe it without touching any remote system
pub fn validate(file: &Path, params: HashMap<String, String>) -> Result<String, ConfigError> {
    let config = RunConfiguration::from_file(file, params)?;

    let source = match &config.mode {
        AcquisitionMode::Directory { local_dir } => format!("files in {}", local_dir.display()),
        AcquisitionMode::Query(server) => {
            format!("query on {}/{}", server.host, server.database)
        }
    };

    Ok(format!(
        "Configuration is valid\n  mode: {} ({source})\n  target: {}:{}{}\n  delete after transmit: {}\n  email notification: {}",
        config.mode.name(),
        config.transfer.hostname,
        config.transfer.port,
        config.transfer.remote_directory,
        config.delete_after_transmit,
        if config.notification_enabled() { "enabled" } else { "disabled" },
    ))
}
