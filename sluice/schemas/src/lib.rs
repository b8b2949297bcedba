//! # Sluice Schemas
//!
//! This crate contains the configuration types used throughout the sluice workspace.
//! A configuration file is first deserialized into the loosely typed [`RawConfig`]
//! (every key optional, grouped in the `SFTP`, `DBServer` and `Email` sections) and then
//! validated exactly once into the immutable [`RunConfiguration`] consumed by every stage.
//!
//! Keeping these types in their own crate avoids dependencies between core and the
//! provider crates (ODBC, SFTP, SMTP), which only need the section they serve.

use bon::Builder;

pub mod error;
pub mod notification;
pub mod raw;
pub mod secret;
pub mod source;
pub mod transfer;

mod values;

pub use error::ValidationError;
pub use notification::{EmailTarget, EmailTargetBuilder, DEFAULT_SMTP_PORT};
pub use raw::{RawConfig, RawDbServer, RawEmail, RawSftp, Scalar};
pub use secret::Secret;
pub use source::{AcquisitionMode, DbServer, DbServerBuilder};
pub use transfer::{SftpTarget, SftpTargetBuilder};

/// Definition of a single delivery run.
///
/// Exactly one [`AcquisitionMode`] is active per run. A missing `email` target means
/// notification is disabled for the run; it is never an error.
///
/// # Examples
///
/// ```
/// use sluice_schemas::{AcquisitionMode, RunConfiguration, SftpTarget};
///
/// let config = RunConfiguration::builder()
///     .transfer(
///         SftpTarget::builder()
///             .hostname("sftp.example.com".to_string())
///             .port(22)
///             .username("courier".to_string())
///             .password("hunter2".into())
///             .remote_directory("/inbound".to_string())
///             .build(),
///     )
///     .mode(AcquisitionMode::Directory { local_dir: "./outbox".into() })
///     .delete_after_transmit(true)
///     .build();
///
/// assert!(!config.notification_enabled());
/// ```
#[derive(Debug, Clone, Builder)]
pub struct RunConfiguration {
    /// Remote transfer target
    pub transfer: SftpTarget,

    /// Where the data to deliver comes from
    pub mode: AcquisitionMode,

    /// Remove local artifacts once their transfer is confirmed
    #[builder(default)]
    pub delete_after_transmit: bool,

    /// Notification target, `None` when the `Email` section is absent or incomplete
    pub email: Option<EmailTarget>,
}

impl RunConfiguration {
    /// Whether a notification will be attempted at the end of the run
    pub fn notification_enabled(&self) -> bool {
        self.email.is_some()
    }
}

impl TryFrom<RawConfig> for RunConfiguration {
    type Error = ValidationError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let Some(sftp) = raw.sftp else {
            return Err(ValidationError::MissingSection("SFTP"));
        };

        let delete_after_transmit = match sftp.delete_flag()? {
            Some(flag) => flag.to_bool("SFTP", "delete_after_transmit")?,
            None => false,
        };
        let local_dir = values::non_blank(sftp.local_dir.clone());
        let transfer = SftpTarget::try_from(sftp)?;

        let mode = match (local_dir, raw.db_server) {
            (Some(_), Some(_)) => return Err(ValidationError::AmbiguousMode),
            (None, None) => return Err(ValidationError::MissingMode),
            (Some(local_dir), None) => AcquisitionMode::Directory {
                local_dir: local_dir.into(),
            },
            (None, Some(db_server)) => AcquisitionMode::Query(DbServer::try_from(db_server)?),
        };

        let email = match raw.email {
            Some(email) => email.into_target(),
            None => None,
        };

        Ok(Self {
            transfer,
            mode,
            delete_after_transmit,
            email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const DIRECTORY_MODE: &str = r#"
        [SFTP]
        hostname = "sftp.example.com"
        port = 22
        username = "courier"
        password = "hunter2"
        remote_directory = "/inbound"
        local_dir = "./outbox"
        delete_after_transmit = true
    "#;

    const QUERY_MODE: &str = r#"
        [SFTP]
        hostname = "sftp.example.com"
        port = "2222"
        username = "courier"
        password = "hunter2"
        remote_directory = "/inbound/"

        [DBServer]
        driver = "{ODBC Driver 18 for SQL Server}"
        host = "db.internal"
        database = "sales"
        username = "reporter"
        password = "s3cret"
        query = "SELECT id, name FROM customers"

        [Email]
        smtp_server = "smtp.example.com"
        sender_email = "robot@example.com"
        sender_password = "mailpass"
        receiver_emails = "ops@example.com, finance@example.com,"
    "#;

    fn parse(raw: &str) -> Result<RunConfiguration, ValidationError> {
        let raw: RawConfig = toml::from_str(raw).unwrap();
        RunConfiguration::try_from(raw)
    }

    #[test]
    fn test_directory_mode() {
        let config = parse(DIRECTORY_MODE).unwrap();

        assert!(matches!(
            config.mode,
            AcquisitionMode::Directory { ref local_dir } if local_dir.to_str() == Some("./outbox")
        ));
        assert!(config.delete_after_transmit);
        assert_eq!(config.transfer.port, 22);
        assert!(!config.notification_enabled());
    }

    #[test]
    fn test_query_mode_with_notification() {
        let config = parse(QUERY_MODE).unwrap();

        let AcquisitionMode::Query(db) = &config.mode else {
            panic!("expected query mode");
        };
        assert_eq!(db.query, "SELECT id, name FROM customers");
        assert_eq!(config.transfer.port, 2222);
        assert!(!config.delete_after_transmit);

        let email = config.email.expect("email should be enabled");
        assert_eq!(email.smtp_port, DEFAULT_SMTP_PORT);
        assert_eq!(
            email.receiver_emails,
            vec!["ops@example.com".to_string(), "finance@example.com".to_string()]
        );
    }

    #[test]
    fn test_missing_remote_directory() {
        let raw = DIRECTORY_MODE.replace("remote_directory = \"/inbound\"", "");
        let error = parse(&raw).unwrap_err();

        assert_eq!(
            error,
            ValidationError::MissingField {
                section: "SFTP",
                key: "remote_directory"
            }
        );
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let raw = DIRECTORY_MODE.replace("\"courier\"", "\"  \"");
        let error = parse(&raw).unwrap_err();

        assert_eq!(
            error,
            ValidationError::MissingField {
                section: "SFTP",
                key: "username"
            }
        );
    }

    #[test]
    fn test_both_modes_are_ambiguous() {
        let raw = format!(
            "{DIRECTORY_MODE}\n[DBServer]\nquery = \"SELECT 1\"\n"
        );

        assert_eq!(parse(&raw).unwrap_err(), ValidationError::AmbiguousMode);
    }

    #[test]
    fn test_no_mode() {
        let raw = DIRECTORY_MODE.replace("local_dir = \"./outbox\"", "");

        assert_eq!(parse(&raw).unwrap_err(), ValidationError::MissingMode);
    }

    #[test]
    fn test_missing_sftp_section() {
        assert_eq!(
            parse("[DBServer]\nquery = \"SELECT 1\"\n").unwrap_err(),
            ValidationError::MissingSection("SFTP")
        );
    }

    #[test]
    fn test_incomplete_db_server() {
        let raw = QUERY_MODE.replace("database = \"sales\"", "");

        assert_eq!(
            parse(&raw).unwrap_err(),
            ValidationError::MissingField {
                section: "DBServer",
                key: "database"
            }
        );
    }

    #[rstest]
    #[case("port = 0")]
    #[case("port = 70000")]
    #[case("port = \"twenty-two\"")]
    fn test_invalid_port(#[case] port: &str) {
        let raw = DIRECTORY_MODE.replace("port = 22", port);

        assert!(matches!(
            parse(&raw),
            Err(ValidationError::InvalidValue {
                section: "SFTP",
                key: "port",
                ..
            })
        ));
    }

    #[rstest]
    #[case("delete_after_transmit = \"yes\"", true)]
    #[case("delete_after_transmit = \"off\"", false)]
    #[case("delete_csv_after_transmit = true", true)]
    #[case("", false)]
    fn test_delete_after_transmit_flag(#[case] line: &str, #[case] expected: bool) {
        let raw = DIRECTORY_MODE.replace("delete_after_transmit = true", line);

        assert_eq!(parse(&raw).unwrap().delete_after_transmit, expected);
    }

    #[test]
    fn test_incomplete_email_disables_notification() {
        let raw = QUERY_MODE.replace("sender_password = \"mailpass\"", "");

        assert!(parse(&raw).unwrap().email.is_none());
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_malformed_email_value_keeps_configuration() {
        let raw = format!("{DIRECTORY_MODE}\n[Email]\nsmtp_port = \"smtp\"\n");
        let config = parse(&raw).unwrap();

        assert!(config.email.is_none());
        assert!(!config.notification_enabled());
        assert!(logs_contain("smtp_port"));
    }

    #[rstest]
    #[case::sftp("SFTP", DIRECTORY_MODE.replace("port = 22", "port = 22\ntimeout_secs = 0"))]
    #[case::db_server(
        "DBServer",
        QUERY_MODE.replace("query = \"SELECT", "timeout_secs = \"0\"\nquery = \"SELECT")
    )]
    fn test_zero_timeout_is_rejected(#[case] section: &str, #[case] raw: String) {
        let error = parse(&raw).unwrap_err();

        assert!(matches!(
            error,
            ValidationError::InvalidValue { section: s, key: "timeout_secs", .. } if s == section
        ));
    }

    #[test]
    fn test_both_delete_spellings_are_rejected() {
        let raw = DIRECTORY_MODE.replace(
            "delete_after_transmit = true",
            "delete_after_transmit = true\ndelete_csv_after_transmit = true",
        );

        assert!(matches!(
            parse(&raw),
            Err(ValidationError::ConflictingKeys { section: "SFTP", .. })
        ));
    }

    #[test]
    fn test_secrets_are_redacted() {
        let config = parse(QUERY_MODE).unwrap();
        let debug = format!("{config:?}");

        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("s3cret"));
        assert!(!debug.contains("mailpass"));
    }
}
