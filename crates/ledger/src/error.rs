//! Ledger Error Types
//!
//! A damaged or missing store is not an error (the ledger starts empty and
//! logs a warning). Only hashing media and writing the store can fail.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A ledger error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The file to checksum could not be read.
    #[display("could not checksum file: {}", _0.display())]
    Checksum(#[error(not(source))] PathBuf),
    /// The store could not be written or moved into place.
    #[display("could not persist ledger: {}", _0.display())]
    Persist(#[error(not(source))] PathBuf),
    /// The entries could not be encoded (non UTF-8 paths).
    #[display("could not serialize ledger entries")]
    Serialize,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Checksum(_) | Self::Persist(_))
    }
}
