//! Duplicate detection for imports.
//!
//! Media is identified by a BLAKE3 checksum of its content. The [`Ledger`]
//! remembers where each checksum was imported to, so that importing the same
//! photo twice can be skipped.

mod checksum;
pub mod error;
mod ledger;

pub use crate::checksum::{checksum, checksum_reader};
pub use crate::ledger::Ledger;
