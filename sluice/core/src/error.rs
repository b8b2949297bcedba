//! Errors that end a run

use crate::execution::acquire::AcquisitionError;
use crate::execution::serialize::SerializationError;
use crate::execution::transport::TransportError;

pub type Result<T> = core::result::Result<T, Error>;

/// A fatal stage failure. The first one encountered becomes the run's outcome;
/// best-effort stages (cleanup, notification) have their own error types and never
/// produce one of these.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Acquisition failed: {0}")]
    Acquisition(#[source] Box<AcquisitionError>),

    #[error("Serialization failed: {0}")]
    Serialization(#[source] Box<SerializationError>),

    #[error("Transfer failed: {0}")]
    Transport(#[source] Box<TransportError>),
}

impl From<AcquisitionError> for Error {
    fn from(error: AcquisitionError) -> Self {
        Error::Acquisition(Box::new(error))
    }
}

impl From<SerializationError> for Error {
    fn from(error: SerializationError) -> Self {
        Error::Serialization(Box::new(error))
    }
}

impl From<TransportError> for Error {
    fn from(error: TransportError) -> Self {
        Error::Transport(Box::new(error))
    }
}
