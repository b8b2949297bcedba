use thiserror::Error;

/// Error types for ODBC operations with security-conscious error messages.
///
/// IMPORTANT: This type never includes connection strings or other sensitive
/// information in error messages to prevent password leakage.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to connect to the data source: {0}")]
    Connect(#[source] arrow_odbc::odbc_api::Error),

    #[error("Failed to execute query: {0}")]
    Execute(#[source] arrow_odbc::odbc_api::Error),

    #[error("Failed to fetch query results: {0}")]
    Fetch(#[source] arrow_odbc::odbc_api::Error),

    #[error(transparent)]
    OdbcApi(#[from] arrow_odbc::odbc_api::Error),
}
