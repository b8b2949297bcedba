//! Query acquisition via ODBC using the `odbc_api` crate re-exported by
//! [arrow-odbc](https://docs.rs/arrow-odbc).
//!
//! The whole result set is fetched eagerly and every value is returned as text,
//! which is exactly what the CSV serializer writes.

pub mod error;
pub mod source;

pub use error::Error;
pub use source::{fetch_rows, QueryResult, Row};

pub type Result<T> = core::result::Result<T, error::Error>;
