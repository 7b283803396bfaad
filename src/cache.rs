//! Persistent memoization of backend results.
//!
//! Entries are keyed by a function identity plus its normalized arguments and
//! never expire. `DiskCache` is content-addressed: the file name is the SHA-256
//! of the canonical key.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Identity of one memoized call: which function, with which arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheKey {
    function: String,
    args: Vec<String>,
}

impl CacheKey {
    pub fn new(function: &str) -> Self {
        Self {
            function: function.to_string(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Adds a word set as a single argument. Callers pass the sorted unique set
    /// so that input order never changes the key.
    pub fn words<'a>(self, words: impl IntoIterator<Item = &'a String>) -> Self {
        let list: Vec<&String> = words.into_iter().collect();
        let encoded = serde_json::to_string(&list).unwrap_or_default();
        self.arg(encoded)
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    /// Hex SHA-256 of the canonical JSON encoding of the key.
    pub fn digest(&self) -> String {
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(&canonical))
    }
}

/// Storage capability for memoized values. Values are opaque bytes.
pub trait CacheStore {
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError>;
    fn put(&self, key: &CacheKey, value: &[u8]) -> Result<(), CacheError>;
}

impl<C: CacheStore + ?Sized> CacheStore for &C {
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        (**self).get(key)
    }

    fn put(&self, key: &CacheKey, value: &[u8]) -> Result<(), CacheError> {
        (**self).put(key, value)
    }
}

/// On-disk store laid out as `<root>/<function>/<digest>.json`.
#[derive(Debug, Clone)]
pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root
            .join(sanitize_component(key.function()))
            .join(format!("{}.json", key.digest()))
    }
}

impl CacheStore for DiskCache {
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.entry_path(key);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }

    fn put(&self, key: &CacheKey, value: &[u8]) -> Result<(), CacheError> {
        let path = self.entry_path(key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        // Readers only ever see complete entries.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|source| CacheError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| CacheError::Io { path, source })
    }
}

fn sanitize_component(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

/// Process-local store. Used where persistence is not wanted, and in tests.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, CacheError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(&key.digest()).cloned())
    }

    fn put(&self, key: &CacheKey, value: &[u8]) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.digest(), value.to_vec());
        Ok(())
    }
}

/// Returns the stored value for `key`, or runs `compute` and stores its result.
///
/// Cache failures never fail the call: an unreadable or undecodable entry is
/// recomputed and a failed write only loses the memoization. Errors from
/// `compute` are returned as-is and nothing is stored.
pub async fn memoize<T, E, F, Fut>(store: &impl CacheStore, key: &CacheKey, compute: F) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    memoize_when(store, key, move || async move { compute().await.map(|value| (value, true)) }).await
}

/// Like [`memoize`], but `compute` also reports whether its value may be
/// stored. A value flagged `false` is returned without being written, so the
/// next call computes it again.
pub async fn memoize_when<T, E, F, Fut>(store: &impl CacheStore, key: &CacheKey, compute: F) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(T, bool), E>>,
{
    match store.get(key) {
        Ok(Some(bytes)) => match serde_json::from_slice::<T>(&bytes) {
            Ok(value) => {
                debug!(function = key.function(), "cache hit");
                return Ok(value);
            }
            Err(e) => warn!(function = key.function(), error = %e, "discarding corrupt cache entry"),
        },
        Ok(None) => debug!(function = key.function(), "cache miss"),
        Err(e) => warn!(function = key.function(), error = %e, "cache read failed"),
    }

    let (value, storable) = compute().await?;
    if !storable {
        debug!(function = key.function(), "partial result not cached");
        return Ok(value);
    }

    match serde_json::to_vec(&value) {
        Ok(bytes) => {
            if let Err(e) = store.put(key, &bytes) {
                warn!(function = key.function(), error = %e, "cache write failed");
            }
        }
        Err(e) => warn!(function = key.function(), error = %e, "cache value not serializable"),
    }

    Ok(value)
}
