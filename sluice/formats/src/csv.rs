use std::fs::File;
use std::io::Write;
use std::path::Path;

use ::csv::{Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{Error, Result};

/// Line terminator written after each record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LineTerminator {
    /// `\r\n` on Windows, `\n` everywhere else
    #[default]
    Native,
    Lf,
    CrLf,
}

impl LineTerminator {
    fn to_csv(self) -> Terminator {
        match self {
            LineTerminator::Native if cfg!(windows) => Terminator::CRLF,
            LineTerminator::Native | LineTerminator::Lf => Terminator::Any(b'\n'),
            LineTerminator::CrLf => Terminator::CRLF,
        }
    }
}

/// CSV format options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvOptions {
    /// Defaults to false, writes the column names as the first record
    pub has_header: bool,

    /// Defaults to `,`, sets the delimiter char for the CSV file
    pub delimiter: char,

    /// Defaults to the platform convention
    pub terminator: LineTerminator,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: false,
            delimiter: ',',
            terminator: LineTerminator::Native,
        }
    }
}

impl CsvOptions {
    /// Create new CSV options
    pub fn new(has_header: bool, delimiter: char, terminator: LineTerminator) -> Self {
        Self {
            has_header,
            delimiter,
            terminator,
        }
    }

    fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter {
            '"' | '\r' | '\n' => Err(Error::InvalidDelimiter(self.delimiter)),
            c if c.is_ascii() => Ok(c as u8),
            c => Err(Error::InvalidDelimiter(c)),
        }
    }
}

/// Write rows to `path` as CSV, replacing any existing file.
///
/// `None` values are written as empty fields. Rows are written as given, widths are not
/// checked against the header.
#[instrument(skip(columns, rows, options), fields(rows = rows.len()), err)]
pub fn write_csv(
    path: &Path,
    columns: &[String],
    rows: &[Vec<Option<String>>],
    options: &CsvOptions,
) -> Result<u64> {
    let delimiter = options.delimiter_byte()?;
    let file = File::create(path)?;

    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(options.terminator.to_csv())
        .flexible(true)
        .from_writer(file);

    if options.has_header {
        writer.write_record(columns)?;
    }

    let mut written = 0u64;
    for row in rows {
        writer.write_record(
            row.iter()
                .map(|value| value.as_deref().unwrap_or_default()),
        )?;
        written += 1;
    }

    let mut file = writer
        .into_inner()
        .map_err(|e| Error::IO(e.into_error()))?;
    file.flush()?;
    file.sync_all()?;

    debug!("Wrote {written} records to {}", path.display());

    Ok(written)
}
