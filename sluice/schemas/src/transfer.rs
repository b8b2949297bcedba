//! Remote transfer target

use std::time::Duration;

use bon::Builder;

use crate::error::{required, ValidationError};
use crate::raw::RawSftp;
use crate::secret::Secret;

const SECTION: &str = "SFTP";

/// Connection parameters of the SFTP server receiving the artifacts
#[derive(Debug, Clone, Builder)]
pub struct SftpTarget {
    pub hostname: String,
    pub port: u16,
    pub username: String,
    pub password: Secret,

    /// Directory on the server every artifact is uploaded into
    pub remote_directory: String,

    /// Applied to the TCP connect and every blocking session call
    pub timeout: Option<Duration>,
}

impl SftpTarget {
    /// Remote destination for a file: `remote_directory + "/" + file_name`
    pub fn remote_path(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.remote_directory.trim_end_matches('/'))
    }
}

impl TryFrom<RawSftp> for SftpTarget {
    type Error = ValidationError;

    fn try_from(raw: RawSftp) -> Result<Self, Self::Error> {
        let hostname = required(raw.hostname, SECTION, "hostname")?;
        let port = raw
            .port
            .ok_or(ValidationError::MissingField {
                section: SECTION,
                key: "port",
            })?
            .to_port(SECTION, "port")?;
        let username = required(raw.username, SECTION, "username")?;
        let password = required(raw.password, SECTION, "password")?.into();
        let remote_directory = required(raw.remote_directory, SECTION, "remote_directory")?;
        let timeout = raw
            .timeout_secs
            .map(|t| t.to_timeout(SECTION, "timeout_secs"))
            .transpose()?;

        Ok(Self {
            hostname,
            port,
            username,
            password,
            remote_directory,
            timeout,
        })
    }
}
