//! Template Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Missing metadata is never an error: it is handled by the fallback grammar.
//! Only structurally broken templates and unrenderable dates end up here.

use derive_more::{Display, Error};

/// A template error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for template operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Generic wrapper raised by the public entry points.
    #[display("issue with path generation from template")]
    Template,
    /// A quoted literal was opened but never closed.
    #[display("unbalanced quote starting at byte {_0}")]
    UnbalancedQuote(#[error(not(source))] usize),
    /// File-name templates describe a single path component.
    #[display("file name template must not contain '/': {_0}")]
    InvalidFileName(#[error(not(source))] String),
    /// A date atom had to be rendered but the metadata carries no capture date.
    #[display("metadata has no capture date")]
    MissingDate,
    /// The rendered path would leave the destination root.
    #[display("invalid path: {_0}")]
    InvalidPath(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Rendering is pure; the same inputs fail the same way every time.
        false
    }
}
