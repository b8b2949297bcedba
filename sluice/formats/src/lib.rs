//! File format handling for sluice
//!
//! Query results are delivered as delimited text. Quoting follows RFC 4180 so any
//! value containing the delimiter, a quote or a line break reads back unchanged
//! with a standard CSV reader.

mod error;
pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub mod csv;

pub use crate::csv::{write_csv, CsvOptions, LineTerminator};
