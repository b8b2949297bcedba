//! Errors produced while validating a raw configuration

use miette::Diagnostic;
use thiserror::Error;

/// A configuration that cannot describe a complete run.
///
/// Messages name sections and keys only; configured values are never echoed for
/// secret-bearing keys.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ValidationError {
    #[error("Missing configuration section [{0}]")]
    #[diagnostic(
        code(sluice::config::missing_section),
        help("Every configuration needs an [SFTP] section describing the transfer target")
    )]
    MissingSection(&'static str),

    #[error("Missing required key '{key}' in section [{section}]")]
    #[diagnostic(code(sluice::config::missing_field))]
    MissingField {
        section: &'static str,
        key: &'static str,
    },

    #[error("Invalid value for '{key}' in section [{section}]: {reason}")]
    #[diagnostic(code(sluice::config::invalid_value))]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        reason: String,
    },

    #[error("Both '{key}' and '{alias}' are set in section [{section}]")]
    #[diagnostic(
        code(sluice::config::conflicting_keys),
        help("'{alias}' is an older spelling of '{key}'; keep only one of them")
    )]
    ConflictingKeys {
        section: &'static str,
        key: &'static str,
        alias: &'static str,
    },

    #[error("Both SFTP.local_dir and a [DBServer] section are configured")]
    #[diagnostic(
        code(sluice::config::ambiguous_mode),
        help("Configure either SFTP.local_dir (directory mode) or a [DBServer] section (query mode), not both")
    )]
    AmbiguousMode,

    #[error("No data source configured")]
    #[diagnostic(
        code(sluice::config::missing_mode),
        help("Set SFTP.local_dir to deliver files from a directory, or add a [DBServer] section to deliver query results")
    )]
    MissingMode,
}

/// Fetch a required string key, treating blank values as absent
pub(crate) fn required(
    value: Option<String>,
    section: &'static str,
    key: &'static str,
) -> Result<String, ValidationError> {
    crate::values::non_blank(value).ok_or(ValidationError::MissingField { section, key })
}
