//! Planning and recording imports.
//!
//! An import is split in two so that the caller owns the actual file transfer
//! (copy, move, upload...):
//!
//! 1. [`plan_import`] checksums the source, consults the [`Ledger`] and
//!    generates the destination path, returning an [`Import`].
//! 2. After transferring the file, [`commit_import`] records the destination in
//!    the ledger and flushes it to disk.

use crate::Context;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use shoebox_ledger::{Ledger, checksum};
use shoebox_template::Metadata;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// The outcome of planning the import of a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Import {
    /// The file should be transferred to [`Plan::destination`].
    Planned(Plan),
    /// The same content was already imported to `existing`; nothing to do.
    Duplicate { checksum: String, existing: PathBuf },
    /// The file already sits at its generated destination.
    SameLocation(PathBuf),
}

/// A file transfer to perform before calling [`commit_import`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub source: PathBuf,
    pub checksum: String,
    pub destination: PathBuf,
}

/// Decides where `source` belongs under `root`, unless it is a duplicate.
///
/// `base_name` and `extension` are taken from the source file name when the
/// metadata does not provide them.
///
/// A ledger entry whose recorded path no longer exists is treated as stale and
/// does not prevent the import.
///
/// # Errors
/// - [`ErrorKind::Io`] or [`ErrorKind::NotAFile`] if `source` isn't a readable
///   regular file.
/// - [`ErrorKind::Checksum`] if its content could not be hashed.
/// - [`ErrorKind::Template`] if no path could be generated (for example, no
///   capture date while the templates render one).
#[instrument(skip_all, fields(source = %source.as_ref().display()))]
pub fn plan_import(
    ledger: &Ledger,
    ctx: &Context,
    root: impl AsRef<Path>,
    source: impl AsRef<Path>,
    metadata: &Metadata,
) -> Result<Import> {
    let source = source.as_ref();
    let stat = std::fs::metadata(source).or_raise(|| ErrorKind::Io(source.to_path_buf()))?;
    if !stat.is_file() {
        exn::bail!(ErrorKind::NotAFile(source.to_path_buf()));
    }
    let checksum = checksum(source).or_raise(|| ErrorKind::Checksum(source.to_path_buf()))?;

    if !ctx.allow_duplicates
        && let Some(existing) = ledger.lookup(&checksum)
    {
        if existing.is_file() {
            tracing::info!(existing = %existing.display(), "Skipping duplicate");
            return Ok(Import::Duplicate { checksum, existing });
        }
        tracing::warn!(existing = %existing.display(), "Ignoring stale ledger entry");
    }

    let metadata = with_file_name(metadata, source);
    let relative = ctx.generator.generate(&metadata).or_raise(|| ErrorKind::Template)?;
    let destination = root.as_ref().join(relative);
    if is_same_file(source, &destination) {
        tracing::debug!("Already in place");
        return Ok(Import::SameLocation(destination));
    }
    tracing::debug!(destination = %destination.display(), "Planned import");
    Ok(Import::Planned(Plan { source: source.to_path_buf(), checksum, destination }))
}

/// Records a transferred file in the ledger and flushes it.
///
/// Returns the destination, for convenience.
#[instrument(skip_all, fields(destination = %plan.destination.display()))]
pub fn commit_import(ledger: &Ledger, plan: Plan) -> Result<PathBuf> {
    if let Some(previous) = ledger.record(plan.checksum, plan.destination.clone())
        && previous != plan.destination
    {
        tracing::debug!(previous = %previous.display(), "Replaced ledger entry");
    }
    ledger.flush().or_raise(|| ErrorKind::Ledger)?;
    Ok(plan.destination)
}

fn with_file_name(metadata: &Metadata, source: &Path) -> Metadata {
    let mut metadata = metadata.clone();
    if metadata.base_name.is_none() {
        metadata.base_name = source.file_stem().map(|s| s.to_string_lossy().into_owned());
    }
    if metadata.extension.is_none() {
        metadata.extension = source.extension().map(|s| s.to_string_lossy().into_owned());
    }
    metadata
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
