//! Importing media into a shoebox library.
//!
//! The primary entry points are [`plan_import`] and [`commit_import`]; see the
//! [`import`] module for the workflow.

pub mod error;
pub mod import;

pub use crate::import::{Import, Plan, commit_import, plan_import};
use shoebox_template::PathGenerator;

/// Everything an import needs besides the ledger.
#[derive(Debug, Clone)]
pub struct Context {
    pub generator: PathGenerator,
    /// Import content even when the ledger already knows it.
    pub allow_duplicates: bool,
}
