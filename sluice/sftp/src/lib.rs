//! SFTP transport for sluice
//!
//! This crate wraps [ssh2](https://docs.rs/ssh2) behind two small traits:
//!
//! - [`Connector`] opens one authenticated session
//! - [`RemoteSession`] uploads files over that session
//!
//! Sessions are released when dropped, so every exit path (including an early
//! error while uploading) disconnects from the server. All calls are blocking;
//! callers running inside an async runtime should move them to a blocking thread.

pub mod error;
pub use error::Error;
pub type Result<T> = core::result::Result<T, Error>;

mod session;

pub use session::{Connector, RemoteSession, Ssh2Connector, Ssh2Session};
