//! JSON-file-based storage backend.
//!
//! Stores each key as a separate JSON document under a configurable
//! directory (default: `$XDG_DATA_HOME/fintrack-rs/`).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use crate::error::{FinTrackError, Result};

use super::validate_key;

/// Application name used for the XDG data directory.
const APP_NAME: &str = "fintrack-rs";

/// Extension of every stored document.
const DOCUMENT_EXTENSION: &str = "json";

/// Sentinel file used for cross-process file locking.
const LOCK_FILE: &str = "storage.lock";

/// File-backed storage that persists each key as a JSON document.
///
/// # Concurrency
///
/// Thread safety within a single process is provided by an in-process
/// [`Mutex`]. Cross-process safety is achieved via an advisory file lock
/// on `storage.lock` (using [`std::fs::File::lock`] /
/// [`std::fs::File::lock_shared`]).
///
/// Read operations acquire a shared lock (allowing concurrent readers),
/// while write operations acquire an exclusive lock.
///
/// # File layout
///
/// ```text
/// <dir>/
///   storage.lock          (cross-process lock sentinel)
///   user_preferences.json
///   transactions.json
/// ```
#[derive(Debug)]
pub struct FileStorage {
    /// Root directory containing all JSON files.
    dir: PathBuf,
    /// Mutex serializing concurrent in-process access.
    lock: Mutex<()>,
    /// Sentinel file for cross-process advisory locking.
    lock_file: fs::File,
}

impl FileStorage {
    /// Creates a new file storage rooted at the given directory.
    ///
    /// Creates the directory (and parents) if it does not exist. Also
    /// opens (or creates) the `storage.lock` sentinel file used for
    /// cross-process advisory locking.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the lock
    /// file cannot be opened.
    #[inline]
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).map_err(storage_io_error)?;
        let lock_file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))
            .map_err(storage_io_error)?;
        tracing::debug!(dir = %dir.display(), "opened file storage");
        Ok(Self {
            dir,
            lock: Mutex::new(()),
            lock_file,
        })
    }

    /// Returns the default XDG-compliant data directory for this application.
    ///
    /// On Linux: `$XDG_DATA_HOME/fintrack-rs/` (typically
    /// `~/.local/share/fintrack-rs/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform data directory cannot be determined.
    #[inline]
    pub fn default_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|data_path| data_path.join(APP_NAME))
            .ok_or_else(|| {
                FinTrackError::Storage("could not determine platform data directory".into())
            })
    }

    /// Returns the storage root directory.
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // ── Private helpers ─────────────────────────────────────────────

    /// Returns the document path for a (validated) key.
    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{DOCUMENT_EXTENSION}"))
    }

    /// Acquires an in-process mutex guard and a shared (read) file lock,
    /// executes `op`, then releases the file lock.
    fn with_shared_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        self.lock_file.lock_shared().map_err(storage_io_error)?;
        let result = op();
        // Only surface the unlock error when the operation succeeded;
        // otherwise the original error is more useful.
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }

    /// Acquires an in-process mutex guard and an exclusive (write) file
    /// lock, executes `op`, then releases the file lock.
    fn with_exclusive_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        self.lock_file.lock().map_err(storage_io_error)?;
        let result = op();
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }

    /// Reads and parses a document. Missing files, `null` documents and
    /// unparseable contents all yield `None`.
    fn read_document(&self, key: &str) -> Result<Option<Value>> {
        validate_key(key)?;
        let path = self.path(key);
        self.with_shared_lock(|| match fs::read_to_string(&path) {
            Ok(contents) => Ok(parse_document(key, &contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(storage_io_error(err)),
        })
    }

    /// Writes a document atomically (write-to-tmp then rename), or removes
    /// it when `value` is `None`.
    fn write_document(&self, key: &str, value: Option<&Value>) -> Result<()> {
        validate_key(key)?;
        let path = self.path(key);
        self.with_exclusive_lock(|| {
            let Some(document) = value else {
                return match fs::remove_file(&path) {
                    Ok(()) => Ok(()),
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                    Err(err) => Err(storage_io_error(err)),
                };
            };
            let tmp_path = self.dir.join(format!("{key}.{DOCUMENT_EXTENSION}.tmp"));
            let json = serde_json::to_string_pretty(document).map_err(FinTrackError::from)?;
            fs::write(&tmp_path, json).map_err(storage_io_error)?;
            fs::rename(&tmp_path, &path).map_err(storage_io_error)?;
            Ok(())
        })
    }
}

// ── Free-standing helpers ───────────────────────────────────────────────

/// Parses stored text, logging and discarding unreadable documents.
fn parse_document(key: &str, contents: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(contents) {
        Ok(Value::Null) => None,
        Ok(document) => Some(document),
        Err(err) => {
            tracing::warn!(key = %key, error = %err, "discarding unreadable document");
            None
        }
    }
}

/// Wraps an I/O error into a [`FinTrackError::Storage`].
fn storage_io_error(err: std::io::Error) -> FinTrackError {
    FinTrackError::Storage(Box::new(err))
}

/// Wraps a mutex poison error into a [`FinTrackError::Storage`].
fn lock_poison_error<T>(err: &std::sync::PoisonError<T>) -> FinTrackError {
    FinTrackError::Storage(err.to_string().into())
}

// ── BlockingStorage implementation ──────────────────────────────────────

#[cfg(feature = "blocking")]
impl super::BlockingStorage for FileStorage {
    #[inline]
    fn load(&self, key: &str) -> Result<Option<Value>> {
        self.read_document(key)
    }

    #[inline]
    fn save(&self, key: &str, value: Option<Value>) -> Result<()> {
        self.write_document(key, value.as_ref())
    }
}

// ── Storage (async) implementation ──────────────────────────────────────

#[cfg(feature = "async")]
impl super::Storage for FileStorage {
    #[inline]
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<Value>>> + Send {
        core::future::ready(self.read_document(key))
    }

    #[inline]
    fn save(&self, key: &str, value: Option<Value>) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.write_document(key, value.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::keys;
    use serde_json::json;

    /// Helper to create a [`FileStorage`] in a temporary directory.
    fn temp_storage() -> (FileStorage, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        (storage, dir)
    }

    #[test]
    fn lockfile_created_on_construction() {
        let (storage, _dir) = temp_storage();
        assert!(storage.dir().join(LOCK_FILE).exists());
    }

    #[test]
    fn missing_document_is_none() {
        let (storage, _dir) = temp_storage();
        assert!(storage.read_document(keys::TRANSACTIONS).unwrap().is_none());
    }

    #[test]
    fn write_then_read_document() {
        let (storage, _dir) = temp_storage();
        let doc = json!({"name": "Alex", "theme": "dark"});
        storage
            .write_document(keys::USER_PREFERENCES, Some(&doc))
            .unwrap();
        assert!(storage.path(keys::USER_PREFERENCES).exists());
        assert_eq!(
            storage.read_document(keys::USER_PREFERENCES).unwrap(),
            Some(doc)
        );
    }

    #[test]
    fn write_none_removes_document() {
        let (storage, _dir) = temp_storage();
        storage
            .write_document(keys::TRANSACTIONS, Some(&json!({"transactions": []})))
            .unwrap();
        storage.write_document(keys::TRANSACTIONS, None).unwrap();
        assert!(!storage.path(keys::TRANSACTIONS).exists());
        assert!(storage.read_document(keys::TRANSACTIONS).unwrap().is_none());
    }

    #[test]
    fn clearing_missing_document_is_ok() {
        let (storage, _dir) = temp_storage();
        storage.write_document(keys::TRANSACTIONS, None).unwrap();
    }

    #[test]
    fn corrupt_document_reads_as_none() {
        let (storage, _dir) = temp_storage();
        fs::write(storage.path(keys::TRANSACTIONS), "{ not json").unwrap();
        assert!(storage.read_document(keys::TRANSACTIONS).unwrap().is_none());
    }

    #[test]
    fn null_document_reads_as_none() {
        let (storage, _dir) = temp_storage();
        fs::write(storage.path(keys::USER_PREFERENCES), "null").unwrap();
        assert!(
            storage
                .read_document(keys::USER_PREFERENCES)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn invalid_key_is_rejected() {
        let (storage, _dir) = temp_storage();
        let err = storage.read_document("../escape").unwrap_err();
        assert!(matches!(err, FinTrackError::InvalidKey(_)));
        let err = storage.write_document("a/b", Some(&json!(1))).unwrap_err();
        assert!(matches!(err, FinTrackError::InvalidKey(_)));
    }

    #[test]
    fn documents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let doc = json!({"transactions": [], "totalBalance": 0.0});
        {
            let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
            storage.write_document(keys::TRANSACTIONS, Some(&doc)).unwrap();
        }
        let reopened = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.read_document(keys::TRANSACTIONS).unwrap(), Some(doc));
    }

    #[test]
    fn no_tmp_file_left_behind() {
        let (storage, _dir) = temp_storage();
        storage
            .write_document(keys::TRANSACTIONS, Some(&json!({})))
            .unwrap();
        let leftovers: Vec<_> = fs::read_dir(storage.dir())
            .unwrap()
            .filter_map(core::result::Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn default_dir_returns_path() {
        // Just verify it doesn't error on supported platforms.
        let dir = FileStorage::default_dir();
        assert!(dir.is_ok());
    }

    #[cfg(feature = "blocking")]
    mod blocking {
        use super::*;
        use crate::storage::BlockingStorage;

        #[test]
        fn save_and_load() {
            let (storage, _dir) = temp_storage();
            storage
                .save(keys::USER_PREFERENCES, Some(json!({"name": "Alex"})))
                .unwrap();
            assert_eq!(
                storage.load(keys::USER_PREFERENCES).unwrap(),
                Some(json!({"name": "Alex"}))
            );
            storage.save(keys::USER_PREFERENCES, None).unwrap();
            assert!(storage.load(keys::USER_PREFERENCES).unwrap().is_none());
        }

        #[test]
        fn concurrent_saves_are_safe() {
            use std::sync::Arc;
            use std::thread;

            let (storage, _dir) = temp_storage();
            let storage = Arc::new(storage);
            let num_threads: usize = 8;
            let writes_per_thread: usize = 25;

            let handles: Vec<_> = (0..num_threads)
                .map(|thread_idx| {
                    let storage = Arc::clone(&storage);
                    thread::spawn(move || {
                        for write_idx in 0..writes_per_thread {
                            storage
                                .save(
                                    keys::TRANSACTIONS,
                                    Some(json!({"writer": thread_idx, "seq": write_idx})),
                                )
                                .unwrap();
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            let last = storage.load(keys::TRANSACTIONS).unwrap().unwrap();
            assert_eq!(last["seq"], writes_per_thread - 1);
        }
    }

    #[cfg(feature = "async")]
    mod async_tests {
        use super::*;
        use crate::storage::Storage;

        #[tokio::test]
        async fn save_and_load() {
            let (storage, _dir) = temp_storage();
            storage
                .save(keys::TRANSACTIONS, Some(json!({"transactions": []})))
                .await
                .unwrap();
            let loaded = storage.load(keys::TRANSACTIONS).await.unwrap();
            assert_eq!(loaded, Some(json!({"transactions": []})));
        }

        #[tokio::test]
        async fn load_missing_is_none() {
            let (storage, _dir) = temp_storage();
            assert!(storage.load(keys::USER_PREFERENCES).await.unwrap().is_none());
        }
    }
}
