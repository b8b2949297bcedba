//! Common test utilities for sluice core testing.
//!
//! In-process stand-ins for the external collaborators (SFTP server, data source,
//! mail relay) plugged in at the stage trait seams.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sluice_core::execution::{AcquisitionError, Notification, NotificationError, SerializationError};
use sluice_core::prelude::*;
use sluice_notify::{MailSender, Message};
use sluice_odbc::QueryResult;
use sluice_schemas::{EmailTarget, SftpTarget};
use sluice_sftp::{Connector, RemoteSession};

pub const REMOTE_DIRECTORY: &str = "/inbound";

pub fn sftp_target() -> SftpTarget {
    SftpTarget::builder()
        .hostname("sftp.example.com".to_string())
        .port(22)
        .username("courier".to_string())
        .password("hunter2".into())
        .remote_directory(REMOTE_DIRECTORY.to_string())
        .build()
}

pub fn email_target(receivers: &[&str]) -> EmailTarget {
    EmailTarget::builder()
        .smtp_server("smtp.example.com".to_string())
        .sender_email("robot@example.com".to_string())
        .sender_password("mailpass".into())
        .receiver_emails(receivers.iter().map(ToString::to_string).collect())
        .build()
}

/// Write `files` (name, content) into a fresh temporary directory
pub fn outbox(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in files {
        std::fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

/// What the fake SFTP server observed
#[derive(Debug, Default)]
pub struct RemoteServer {
    pub connects: Mutex<usize>,
    pub files: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RemoteServer {
    pub fn connect_count(&self) -> usize {
        *self.connects.lock().unwrap()
    }

    pub fn uploaded_paths(&self) -> Vec<String> {
        self.files
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    pub fn content(&self, remote: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .iter()
            .find(|(path, _)| path == remote)
            .map(|(_, content)| String::from_utf8_lossy(content).into_owned())
    }
}

/// [`Connector`] talking to a [`RemoteServer`] in memory
#[derive(Debug, Clone, Default)]
pub struct FakeConnector {
    pub server: Arc<RemoteServer>,
    pub reject_credentials: bool,
    pub fail_file: Option<String>,
}

impl FakeConnector {
    pub fn new(server: Arc<RemoteServer>) -> Self {
        Self {
            server,
            ..Default::default()
        }
    }

    pub fn rejecting_credentials(mut self) -> Self {
        self.reject_credentials = true;
        self
    }

    pub fn failing_on(mut self, file_name: &str) -> Self {
        self.fail_file = Some(file_name.to_string());
        self
    }
}

pub struct FakeSession {
    server: Arc<RemoteServer>,
    fail_file: Option<String>,
}

impl Connector for FakeConnector {
    type Session = FakeSession;

    fn connect(&self) -> sluice_sftp::Result<FakeSession> {
        *self.server.connects.lock().unwrap() += 1;

        if self.reject_credentials {
            return Err(sluice_sftp::Error::Authentication {
                username: "courier".to_string(),
                reason: "Username/PublicKey combination invalid".to_string(),
            });
        }

        Ok(FakeSession {
            server: self.server.clone(),
            fail_file: self.fail_file.clone(),
        })
    }
}

impl RemoteSession for FakeSession {
    fn upload(&mut self, local: &Path, remote: &str) -> sluice_sftp::Result<u64> {
        let upload_error = |source: std::io::Error| sluice_sftp::Error::Upload {
            local: local.display().to_string(),
            remote: remote.to_string(),
            source,
        };

        if self
            .fail_file
            .as_deref()
            .is_some_and(|name| local.ends_with(name))
        {
            return Err(upload_error(std::io::Error::other("permission denied")));
        }

        let content = std::fs::read(local).map_err(upload_error)?;
        let bytes = content.len() as u64;
        self.server
            .files
            .lock()
            .unwrap()
            .push((remote.to_string(), content));

        Ok(bytes)
    }
}

pub fn fake_transport(connector: FakeConnector) -> Box<dyn Transport> {
    Box::new(SftpTransport::new(connector, sftp_target()))
}

/// Returns the same result set on every run
pub struct FixedRows(pub QueryResult);

#[async_trait]
impl Acquirer for FixedRows {
    async fn acquire(&self) -> Result<Acquisition, AcquisitionError> {
        Ok(Acquisition::Rows(self.0.clone()))
    }
}

pub fn rows(columns: &[&str], values: &[&[&str]]) -> QueryResult {
    QueryResult::new(
        columns.iter().map(ToString::to_string).collect(),
        values
            .iter()
            .map(|row| row.iter().map(|v| Some(v.to_string())).collect())
            .collect(),
    )
}

/// Writes part of the file and then gives up
pub struct BrokenSerializer;

#[async_trait]
impl Serializer for BrokenSerializer {
    async fn serialize(
        &self,
        _result: QueryResult,
        destination: &Path,
    ) -> Result<Artifact, SerializationError> {
        std::fs::write(destination, "1,x\n2,").unwrap();

        Err(SerializationError::Write {
            path: destination.to_path_buf(),
            source: std::io::Error::other("No space left on device").into(),
        })
    }
}

/// Records every outcome it is asked to report. Clones share the record
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub outcomes: Arc<Mutex<Vec<Option<String>>>>,
}

impl RecordingNotifier {
    pub fn calls(&self) -> usize {
        self.outcomes.lock().unwrap().len()
    }

    /// `None` for a success, the failure message otherwise
    pub fn reported(&self) -> Vec<Option<String>> {
        self.outcomes.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, outcome: &RunOutcome) -> Result<Notification, NotificationError> {
        self.outcomes
            .lock()
            .unwrap()
            .push(outcome.cause().map(ToString::to_string));

        Ok(Notification::Sent)
    }
}

/// Keeps delivered messages instead of talking to a relay
#[derive(Default)]
pub struct Outbox {
    pub messages: Mutex<Vec<String>>,
}

#[async_trait]
impl MailSender for Outbox {
    async fn send(&self, message: Message) -> sluice_notify::Result<()> {
        let raw = String::from_utf8_lossy(&message.formatted()).into_owned();
        self.messages.lock().unwrap().push(raw);
        Ok(())
    }
}

/// Collects progress events for inspection
#[derive(Default)]
pub struct RecordingTracker {
    pub events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingTracker {
    pub fn stages(&self) -> Vec<RunState> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                ProgressEvent::StageStarted { stage } => Some(*stage),
                _ => None,
            })
            .collect()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressTracker for RecordingTracker {
    fn on_progress(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn exists(dir: &Path, name: &str) -> bool {
    dir.join(name).exists()
}
