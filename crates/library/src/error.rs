//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Failures from the template and ledger
//! crates stay attached as children of the frame raised here.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source file could not be inspected.
    #[display("could not read file: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// Only regular files can be imported.
    #[display("not a regular file: {}", _0.display())]
    NotAFile(#[error(not(source))] PathBuf),
    #[display("could not checksum file: {}", _0.display())]
    Checksum(#[error(not(source))] PathBuf),
    #[display("issue with path generation from template")]
    Template,
    #[display("could not update the ledger")]
    Ledger,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Checksum(_) | Self::Ledger)
    }
}
