//! Error types for SFTP operations

use thiserror::Error;

/// Errors that can occur while talking to an SFTP server
#[derive(Debug, Error)]
pub enum Error {
    /// The host name did not resolve to any address
    #[error("Could not resolve SFTP host '{0}'")]
    Resolve(String),

    /// TCP connection to the server failed
    #[error("Failed to connect to SFTP server {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// SSH protocol handshake failed
    #[error("SSH handshake with {address} failed: {source}")]
    Handshake {
        address: String,
        #[source]
        source: ssh2::Error,
    },

    /// The server rejected the credentials
    #[error("Authentication failed for user '{username}': {reason}")]
    Authentication { username: String, reason: String },

    /// The SFTP subsystem could not be started on an authenticated session
    #[error("Failed to open SFTP channel: {0}")]
    Channel(#[source] ssh2::Error),

    /// A single file could not be written to the server
    #[error("Failed to upload '{local}' to '{remote}': {source}")]
    Upload {
        local: String,
        remote: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Connection-level failures end the whole batch, upload failures concern one file
    pub fn is_connection_failure(&self) -> bool {
        !matches!(self, Error::Upload { .. })
    }
}
