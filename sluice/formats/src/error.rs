use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("I/O error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Invalid delimiter {0:?}: must be a single ASCII character other than '\"', '\\r' or '\\n'")]
    InvalidDelimiter(char),
}
