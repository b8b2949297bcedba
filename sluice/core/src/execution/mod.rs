//! Stage implementations used by the pipeline

pub mod acquire;
pub mod cleanup;
pub mod notify;
pub mod serialize;
pub mod traits;
pub mod transport;

pub use acquire::{AcquisitionError, DirectoryAcquirer, DirectoryListing, QueryAcquirer};
pub use cleanup::{maybe_delete, CleanupAction, CleanupError};
pub use notify::{EmailNotifier, Notification, NotificationError};
pub use serialize::{CsvSerializer, SerializationError};
pub use traits::{Acquirer, Notifier, Serializer, Transport};
pub use transport::{SftpTransport, TransportError};
