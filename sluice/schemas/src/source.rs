//! Data acquisition modes

use std::path::PathBuf;
use std::time::Duration;

use bon::Builder;

use crate::error::{required, ValidationError};
use crate::raw::RawDbServer;
use crate::secret::Secret;

const SECTION: &str = "DBServer";

/// The two mutually exclusive ways a run acquires its data
#[derive(Debug, Clone)]
pub enum AcquisitionMode {
    /// Deliver every regular file found in `local_dir` (non-recursive)
    Directory { local_dir: PathBuf },

    /// Run a query and deliver its result set as a single CSV file
    Query(DbServer),
}

impl AcquisitionMode {
    pub fn name(&self) -> &'static str {
        match self {
            AcquisitionMode::Directory { .. } => "directory",
            AcquisitionMode::Query(_) => "query",
        }
    }
}

/// An ODBC data source and the query to run against it
#[derive(Debug, Clone, Builder)]
pub struct DbServer {
    /// ODBC driver name, e.g. `{ODBC Driver 18 for SQL Server}`
    pub driver: String,
    pub host: String,
    pub database: String,
    pub username: String,
    pub password: Secret,
    pub query: String,

    /// ODBC login timeout
    pub timeout: Option<Duration>,

    /// Write the result set's column names as the first line
    #[builder(default)]
    pub include_header: bool,
}

impl DbServer {
    /// ODBC connection string for this server. Contains the password.
    ///
    /// Every value is braced so `;`, `=` and `}` inside it cannot end the attribute early.
    /// A driver that is already written in braces is kept as is.
    pub fn connection_string(&self) -> Secret {
        let driver = if self.driver.starts_with('{') && self.driver.ends_with('}') {
            self.driver.clone()
        } else {
            braced(&self.driver)
        };

        Secret::new(format!(
            "DRIVER={driver};SERVER={};DATABASE={};UID={};PWD={}",
            braced(&self.host),
            braced(&self.database),
            braced(&self.username),
            braced(self.password.expose())
        ))
    }
}

fn braced(value: &str) -> String {
    format!("{{{}}}", value.replace('}', "}}"))
}

impl TryFrom<RawDbServer> for DbServer {
    type Error = ValidationError;

    fn try_from(raw: RawDbServer) -> Result<Self, Self::Error> {
        Ok(Self {
            driver: required(raw.driver, SECTION, "driver")?,
            host: required(raw.host, SECTION, "host")?,
            database: required(raw.database, SECTION, "database")?,
            username: required(raw.username, SECTION, "username")?,
            password: required(raw.password, SECTION, "password")?.into(),
            query: required(raw.query, SECTION, "query")?,
            timeout: raw
                .timeout_secs
                .map(|t| t.to_timeout(SECTION, "timeout_secs"))
                .transpose()?,
            include_header: raw
                .include_header
                .map(|h| h.to_bool(SECTION, "include_header"))
                .transpose()?
                .unwrap_or(false),
        })
    }
}
