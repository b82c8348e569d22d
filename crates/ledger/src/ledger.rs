use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::collections::BTreeMap;
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};
use tempfile::NamedTempFile;
use tracing::instrument;

/// Persistent map of content checksum to the path the content was imported to.
///
/// The store is a single JSON object (`{"<checksum>": "<path>"}`) that is
/// loaded once and only written back by [`flush`](Self::flush).
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, PathBuf>>,
    writer: Mutex<()>,
}
impl Ledger {
    /// Loads the store at `path`.
    ///
    /// Never fails: a missing store starts an empty ledger, and an unreadable
    /// or malformed one is logged and replaced on the next flush.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ledger is malformed, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                tracing::debug!("No ledger yet, starting empty");
                BTreeMap::new()
            },
            Err(e) => {
                tracing::warn!(error = %e, "Ledger is unreadable, starting empty");
                BTreeMap::new()
            },
        };
        tracing::debug!(entries = entries.len(), "Opened ledger");
        Self { path, entries: RwLock::new(entries), writer: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path previously recorded for `checksum`.
    pub fn lookup(&self, checksum: &str) -> Option<PathBuf> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).get(checksum).cloned()
    }

    /// Records `path` for `checksum`, returning the path it replaces.
    ///
    /// Only kept in memory until the next [`flush`](Self::flush).
    pub fn record(&self, checksum: impl Into<String>, path: impl Into<PathBuf>) -> Option<PathBuf> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(checksum.into(), path.into())
    }

    /// Forgets `checksum`, returning the path that was recorded for it.
    pub fn remove(&self, checksum: &str) -> Option<PathBuf> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).remove(checksum)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Atomically replaces the store with the current entries.
    ///
    /// Writes to a temporary file next to the store, syncs it, then renames it
    /// over the store; readers never observe a partial file.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn flush(&self) -> Result<()> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let json = {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            serde_json::to_vec_pretty(&*entries).or_raise(|| ErrorKind::Serialize)?
        };
        let persist = || ErrorKind::Persist(self.path.clone());
        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(directory).or_raise(persist)?;
        let mut temp = NamedTempFile::new_in(directory).or_raise(persist)?;
        temp.write_all(&json).or_raise(persist)?;
        temp.as_file().sync_all().or_raise(persist)?;
        temp.persist(&self.path).map_err(|e| e.error).or_raise(persist)?;
        tracing::debug!(bytes = json.len(), "Flushed ledger");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_record_flush_reload() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = temp_dir.path().join("nested/hash.json");
        let ledger = Ledger::open(&store);
        assert!(ledger.is_empty());
        assert_eq!(ledger.record("abc", "/photos/2015/a.jpg"), None);
        assert_eq!(ledger.lookup("abc"), Some(PathBuf::from("/photos/2015/a.jpg")));
        ledger.flush().unwrap();

        let reloaded = Ledger::open(&store);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.lookup("abc"), Some(PathBuf::from("/photos/2015/a.jpg")));
        assert_eq!(reloaded.lookup("def"), None);
    }

    #[test]
    fn test_record_replaces() {
        let ledger = Ledger::open("unused.json");
        ledger.record("abc", "a.jpg");
        assert_eq!(ledger.record("abc", "b.jpg"), Some(PathBuf::from("a.jpg")));
        assert_eq!(ledger.remove("abc"), Some(PathBuf::from("b.jpg")));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_corrupt_store_starts_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = temp_dir.path().join("hash.json");
        std::fs::write(&store, b"{\"abc\": ").unwrap();
        let ledger = Ledger::open(&store);
        assert!(ledger.is_empty());
        // The next flush replaces the damaged file.
        ledger.record("abc", "a.jpg");
        ledger.flush().unwrap();
        assert_eq!(Ledger::open(&store).lookup("abc"), Some(PathBuf::from("a.jpg")));
    }

    #[test]
    fn test_store_format() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = temp_dir.path().join("hash.json");
        let ledger = Ledger::open(&store);
        ledger.record("abc", "a.jpg");
        ledger.flush().unwrap();
        let written: BTreeMap<String, String> = serde_json::from_slice(&std::fs::read(&store).unwrap()).unwrap();
        assert_eq!(written, BTreeMap::from([("abc".to_string(), "a.jpg".to_string())]));
    }

    #[test]
    fn test_flush_without_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let blocker = temp_dir.path().join("file");
        std::fs::write(&blocker, b"").unwrap();
        let ledger = Ledger::open(blocker.join("hash.json"));
        let err = ledger.flush().unwrap_err();
        assert_eq!(*err, ErrorKind::Persist(blocker.join("hash.json")));
    }

    #[test]
    fn test_concurrent_record_and_flush() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = temp_dir.path().join("hash.json");
        let ledger = Arc::new(Ledger::open(&store));
        let handles = (0..8)
            .map(|n| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    ledger.record(format!("hash-{n}"), format!("{n}.jpg"));
                    ledger.flush().unwrap();
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }
        let reloaded = Ledger::open(&store);
        assert_eq!(reloaded.len(), 8);
        for n in 0..8 {
            assert_eq!(reloaded.lookup(&format!("hash-{n}")), Some(PathBuf::from(format!("{n}.jpg"))));
        }
    }
}
