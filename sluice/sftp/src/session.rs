use std::fs::File;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::Path;

use sluice_schemas::SftpTarget;
use tracing::{debug, instrument, warn};

use crate::{Error, Result};

/// Opens authenticated sessions against one SFTP target
pub trait Connector: Send + Sync {
    type Session: RemoteSession;

    /// Open and authenticate a new session
    fn connect(&self) -> Result<Self::Session>;
}

/// An open session able to upload files
pub trait RemoteSession: Send {
    /// Upload `local` to the absolute or home-relative `remote` path,
    /// replacing an existing remote file. Returns the number of bytes written.
    fn upload(&mut self, local: &Path, remote: &str) -> Result<u64>;
}

/// [`Connector`] backed by libssh2 with password authentication
#[derive(Debug, Clone)]
pub struct Ssh2Connector {
    target: SftpTarget,
}

impl Ssh2Connector {
    pub fn new(target: SftpTarget) -> Self {
        Self { target }
    }

    fn address(&self) -> String {
        format!("{}:{}", self.target.hostname, self.target.port)
    }

    fn open_tcp(&self) -> Result<TcpStream> {
        let addrs: Vec<SocketAddr> = (self.target.hostname.as_str(), self.target.port)
            .to_socket_addrs()
            .map_err(|_| Error::Resolve(self.target.hostname.clone()))?
            .collect();

        let mut last_error = None;
        for addr in addrs {
            let attempt = match self.target.timeout {
                Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
                None => TcpStream::connect(addr),
            };

            match attempt {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    debug!("Connection attempt to {addr} failed: {e}");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(source) => Err(Error::Connect {
                address: self.address(),
                source,
            }),
            None => Err(Error::Resolve(self.target.hostname.clone())),
        }
    }
}

impl Connector for Ssh2Connector {
    type Session = Ssh2Session;

    #[instrument(skip(self), fields(address = %self.address(), username = %self.target.username), err)]
    fn connect(&self) -> Result<Ssh2Session> {
        let address = self.address();
        let tcp = self.open_tcp()?;

        let mut session = ssh2::Session::new().map_err(|source| Error::Handshake {
            address: address.clone(),
            source,
        })?;

        if let Some(timeout) = self.target.timeout {
            session.set_timeout(u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX));
        }

        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|source| Error::Handshake { address, source })?;

        session
            .userauth_password(&self.target.username, self.target.password.expose())
            .map_err(|e| Error::Authentication {
                username: self.target.username.clone(),
                reason: e.message().to_string(),
            })?;

        if !session.authenticated() {
            return Err(Error::Authentication {
                username: self.target.username.clone(),
                reason: "server did not accept the credentials".to_string(),
            });
        }

        let sftp = session.sftp().map_err(Error::Channel)?;

        debug!("SFTP session established");

        Ok(Ssh2Session {
            session,
            sftp: Some(sftp),
        })
    }
}

/// An authenticated SFTP session, disconnected on drop
pub struct Ssh2Session {
    session: ssh2::Session,
    sftp: Option<ssh2::Sftp>,
}

impl RemoteSession for Ssh2Session {
    fn upload(&mut self, local: &Path, remote: &str) -> Result<u64> {
        let upload_error = |source: io::Error| Error::Upload {
            local: local.display().to_string(),
            remote: remote.to_string(),
            source,
        };

        let sftp = self.sftp.as_ref().ok_or_else(|| {
            upload_error(io::Error::new(
                io::ErrorKind::NotConnected,
                "SFTP channel already closed",
            ))
        })?;

        let mut source = File::open(local).map_err(upload_error)?;
        let mut destination = sftp
            .create(Path::new(remote))
            .map_err(|e| upload_error(e.into()))?;

        io::copy(&mut source, &mut destination).map_err(upload_error)
    }
}

impl Drop for Ssh2Session {
    fn drop(&mut self) {
        drop(self.sftp.take());

        match self.session.disconnect(None, "transfer finished", None) {
            Ok(()) => debug!("SFTP session closed"),
            Err(e) => warn!("Failed to close SFTP session cleanly: {e}"),
        }
    }
}
