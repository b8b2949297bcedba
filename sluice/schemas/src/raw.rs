//! Loosely typed mirror of the configuration file.
//!
//! Every key is optional here; presence and shape are checked when converting into
//! [`crate::RunConfiguration`], so a bad file always surfaces as a [`ValidationError`]
//! naming the section and key instead of an opaque deserialization failure.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ValidationError;
use crate::values::parse_flag;

/// The complete configuration file: three optional sections
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfig {
    /// Transfer target and directory-mode settings
    #[serde(default, rename = "SFTP", alias = "sftp")]
    pub sftp: Option<RawSftp>,

    /// Query-mode data source
    #[serde(default, rename = "DBServer", alias = "db_server", alias = "dbserver")]
    pub db_server: Option<RawDbServer>,

    /// Notification target
    #[serde(default, rename = "Email", alias = "email")]
    pub email: Option<RawEmail>,
}

/// `SFTP` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSftp {
    pub hostname: Option<String>,
    pub port: Option<Scalar>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub remote_directory: Option<String>,
    pub local_dir: Option<String>,
    pub delete_after_transmit: Option<Scalar>,

    /// Older spelling of `delete_after_transmit`; setting both is rejected
    pub delete_csv_after_transmit: Option<Scalar>,
    pub timeout_secs: Option<Scalar>,
}

impl RawSftp {
    /// The delete flag under whichever of its two spellings is present
    pub fn delete_flag(&self) -> Result<Option<&Scalar>, ValidationError> {
        match (&self.delete_after_transmit, &self.delete_csv_after_transmit) {
            (Some(_), Some(_)) => Err(ValidationError::ConflictingKeys {
                section: "SFTP",
                key: "delete_after_transmit",
                alias: "delete_csv_after_transmit",
            }),
            (flag, None) | (None, flag) => Ok(flag.as_ref()),
        }
    }
}

/// `DBServer` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDbServer {
    pub driver: Option<String>,
    pub host: Option<String>,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub query: Option<String>,
    pub timeout_secs: Option<Scalar>,
    pub include_header: Option<Scalar>,
}

/// `Email` section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEmail {
    pub smtp_server: Option<String>,
    pub smtp_port: Option<Scalar>,
    pub sender_email: Option<String>,
    pub sender_password: Option<String>,
    pub receiver_emails: Option<String>,
    pub timeout_secs: Option<Scalar>,
}

/// A scalar value that may be written natively or quoted,
/// e.g. `port = 22` and `port = "22"` are both accepted
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Scalar {
    /// Interpret the value as a TCP port in `1..=65535`
    pub fn to_port(&self, section: &'static str, key: &'static str) -> Result<u16, ValidationError> {
        let value = self.to_u64(section, key)?;

        u16::try_from(value)
            .ok()
            .filter(|port| *port != 0)
            .ok_or_else(|| ValidationError::InvalidValue {
                section,
                key,
                reason: format!("'{value}' is not a port between 1 and 65535"),
            })
    }

    /// Interpret the value as a non-negative integer
    pub fn to_u64(&self, section: &'static str, key: &'static str) -> Result<u64, ValidationError> {
        let invalid = |shown: String| ValidationError::InvalidValue {
            section,
            key,
            reason: format!("'{shown}' is not a non-negative integer"),
        };

        match self {
            Scalar::Int(value) => u64::try_from(*value).map_err(|_| invalid(value.to_string())),
            Scalar::Text(text) => text.trim().parse::<u64>().map_err(|_| invalid(text.clone())),
            Scalar::Bool(value) => Err(invalid(value.to_string())),
        }
    }

    /// Interpret the value as a timeout in whole seconds; zero is rejected
    pub fn to_timeout(&self, section: &'static str, key: &'static str) -> Result<Duration, ValidationError> {
        match self.to_u64(section, key)? {
            0 => Err(ValidationError::InvalidValue {
                section,
                key,
                reason: "a timeout must be at least 1 second; leave the key out for no timeout".to_string(),
            }),
            secs => Ok(Duration::from_secs(secs)),
        }
    }

    /// Interpret the value as a flag (`true`/`false`, `yes`/`no`, `on`/`off`, `1`/`0`)
    pub fn to_bool(&self, section: &'static str, key: &'static str) -> Result<bool, ValidationError> {
        let parsed = match self {
            Scalar::Bool(value) => Some(*value),
            Scalar::Int(0) => Some(false),
            Scalar::Int(1) => Some(true),
            Scalar::Int(_) => None,
            Scalar::Text(text) => parse_flag(text),
        };

        parsed.ok_or_else(|| ValidationError::InvalidValue {
            section,
            key,
            reason: format!("'{self}' is not a boolean"),
        })
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Bool(value) => write!(f, "{value}"),
            Scalar::Int(value) => write!(f, "{value}"),
            Scalar::Text(value) => write!(f, "{value}"),
        }
    }
}
