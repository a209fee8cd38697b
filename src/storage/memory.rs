//! In-memory storage backend for testing.
//!
//! Provides [`InMemoryStorage`], a thread-safe in-memory implementation of
//! the storage traits. Ideal for unit and integration tests where file I/O
//! is undesirable.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

#[cfg(feature = "async")]
use core::future::{self, Future};

use crate::error::{FinTrackError, Result};

use super::validate_key;

/// Thread-safe in-memory storage for testing.
///
/// This type implements both [`super::Storage`] (async) and
/// [`super::BlockingStorage`] (blocking) traits, providing a zero-setup
/// storage backend for tests.
///
/// Clones share the same underlying map, so a test can hand one clone to
/// [`crate::fin_track::FinTrack`] and inspect what was written through the
/// other.
///
/// # Example
///
/// ```rust
/// use fintrack_rs::storage::InMemoryStorage;
///
/// let storage = InMemoryStorage::new();
/// let observer = storage.clone();
/// assert!(observer.is_empty());
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryStorage {
    /// All documents behind a single mutex for thread-safe interior
    /// mutability.
    inner: Arc<Mutex<HashMap<String, Value>>>,
}

impl InMemoryStorage {
    /// Creates a new empty in-memory storage.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the document stored under `key`, bypassing the
    /// storage traits.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.with_lock(|inner| inner.get(key).cloned())
            .ok()
            .flatten()
    }

    /// Stores a raw document, bypassing key validation. Used to seed
    /// fixtures.
    #[inline]
    pub fn insert<K: Into<String>>(&self, key: K, value: Value) {
        let _seeded = self.with_lock(|inner| inner.insert(key.into(), value));
    }

    /// Returns `true` when no document is stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.with_lock(|inner| inner.is_empty()).unwrap_or(true)
    }

    /// Acquires the inner lock and applies a closure.
    fn with_lock<R, F: FnOnce(&mut HashMap<String, Value>) -> R>(&self, f: F) -> Result<R> {
        let mut inner = self.inner.lock().map_err(|err| lock_error(&err))?;
        Ok(f(&mut inner))
    }

    /// Loads a document; JSON `null` is reported as absent.
    fn read(&self, key: &str) -> Result<Option<Value>> {
        validate_key(key)?;
        self.with_lock(|inner| inner.get(key).filter(|doc| !doc.is_null()).cloned())
    }

    /// Stores or removes a document.
    fn write(&self, key: &str, value: Option<Value>) -> Result<()> {
        validate_key(key)?;
        self.with_lock(|inner| {
            let _previous = match value {
                Some(document) => inner.insert(key.to_owned(), document),
                None => inner.remove(key),
            };
        })
    }
}

/// Wraps a mutex poison error.
fn lock_error<T>(err: &std::sync::PoisonError<T>) -> FinTrackError {
    FinTrackError::Storage(err.to_string().into())
}

// ── BlockingStorage implementation ──────────────────────────────────────

#[cfg(feature = "blocking")]
impl super::BlockingStorage for InMemoryStorage {
    #[inline]
    fn load(&self, key: &str) -> Result<Option<Value>> {
        self.read(key)
    }

    #[inline]
    fn save(&self, key: &str, value: Option<Value>) -> Result<()> {
        self.write(key, value)
    }
}

// ── Storage (async) implementation ──────────────────────────────────────

#[cfg(feature = "async")]
impl super::Storage for InMemoryStorage {
    #[inline]
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<Value>>> + Send {
        future::ready(self.read(key))
    }

    #[inline]
    fn save(&self, key: &str, value: Option<Value>) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.write(key, value))
    }
}
