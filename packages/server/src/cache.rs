//! Memoization of the two expensive loads: the incident table and the
//! boundary file.
//!
//! Entries are keyed by the identity of their source. Configured files are
//! keyed by path; uploads are keyed by the SHA-256 of their bytes, so
//! uploading the same file twice reuses the parsed table. Nothing expires
//! on its own; callers invalidate explicitly.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sha2::{Digest as _, Sha256};

/// Identity of a load source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKey {
    /// A file on disk.
    Path(PathBuf),
    /// Uploaded content, as a lowercase hex SHA-256 digest.
    Content(String),
}

impl SourceKey {
    /// Keys a file path.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }

    /// Keys uploaded bytes by their SHA-256 digest.
    #[must_use]
    pub fn for_content(bytes: &[u8]) -> Self {
        Self::Content(hex::encode(Sha256::digest(bytes)))
    }

    /// The hex digest of an uploaded-content key.
    #[must_use]
    pub fn content_digest(&self) -> Option<&str> {
        match self {
            Self::Content(digest) => Some(digest),
            Self::Path(_) => None,
        }
    }
}

/// Source key to parsed value memo.
#[derive(Debug)]
pub struct LoadCache<T> {
    entries: Mutex<BTreeMap<SourceKey, Arc<T>>>,
}

impl<T> Default for LoadCache<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<T> LoadCache<T> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<SourceKey, Arc<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached value for `key`, running `load` on a miss.
    ///
    /// A failed load caches nothing.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `load`.
    pub fn get_or_try_load<E>(
        &self,
        key: &SourceKey,
        load: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        let mut entries = self.entries();
        if let Some(value) = entries.get(key) {
            log::debug!("Cache hit for {key:?}");
            return Ok(Arc::clone(value));
        }

        log::debug!("Cache miss for {key:?}");
        let value = Arc::new(load()?);
        entries.insert(key.clone(), Arc::clone(&value));
        Ok(value)
    }

    /// Drops the entry for `key`. Returns whether one existed.
    pub fn invalidate(&self, key: &SourceKey) -> bool {
        self.entries().remove(key).is_some()
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether the cache holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
