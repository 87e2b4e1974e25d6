//! Response cache implementation
//!
//! Provides in-memory and file-backed response storage with atomic writes.

use super::types::{CacheFile, CachedResponse};
use crate::error::{Error, Result};
use crate::types::CacheBackend;
use chrono::Duration;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Default cache name; the file backend stores `isostream_cache.json`
pub const DEFAULT_CACHE_NAME: &str = "isostream_cache";

/// Keyed store of raw API responses
#[derive(Debug, Clone)]
pub struct ResponseCache {
    /// Storage backend
    backend: CacheBackend,
    /// Path to the cache file (empty for the memory backend)
    path: PathBuf,
    /// Entries older than this are misses
    expire_after: Option<Duration>,
    /// Current entries
    entries: Arc<RwLock<BTreeMap<String, CachedResponse>>>,
}

impl ResponseCache {
    /// Open a cache. The file backend loads `{name}.json` if it exists and
    /// drops entries that have already expired, rewriting the file if any
    /// were removed.
    pub fn open(
        backend: CacheBackend,
        name: &str,
        expire_after: Option<Duration>,
    ) -> Result<Self> {
        match backend {
            CacheBackend::Memory => Ok(Self::in_memory().with_expiry(expire_after)),
            CacheBackend::File => Self::load(cache_path(name), expire_after),
        }
    }

    /// Create an in-memory cache
    pub fn in_memory() -> Self {
        Self {
            backend: CacheBackend::Memory,
            path: PathBuf::new(),
            expire_after: None,
            entries: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Create a file-backed cache, loading existing entries if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(path.as_ref().to_path_buf(), None)
    }

    fn load(path: PathBuf, expire_after: Option<Duration>) -> Result<Self> {
        let mut file = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| {
                Error::cache(format!("Failed to read cache file {}: {e}", path.display()))
            })?;
            serde_json::from_str::<CacheFile>(&contents).map_err(|e| {
                Error::cache(format!("Failed to parse cache file {}: {e}", path.display()))
            })?
        } else {
            CacheFile::new()
        };

        let before = file.entries.len();
        file.entries.retain(|_, entry| !entry.is_expired(expire_after));
        let pruned = before - file.entries.len();
        if pruned > 0 {
            let temp_path = path.with_extension("tmp");
            std::fs::write(&temp_path, encode(&file)?)
                .map_err(|e| Error::cache(format!("Failed to write cache file: {e}")))?;
            std::fs::rename(&temp_path, &path)
                .map_err(|e| Error::cache(format!("Failed to rename cache file: {e}")))?;
            debug!(path = %path.display(), pruned, "Dropped expired cache entries");
        }

        info!(
            path = %path.display(),
            entries = file.entries.len(),
            "Opened response cache"
        );

        Ok(Self {
            backend: CacheBackend::File,
            path,
            expire_after,
            entries: Arc::new(RwLock::new(file.entries)),
        })
    }

    /// Set the entry lifetime
    #[must_use]
    pub fn with_expiry(mut self, expire_after: Option<Duration>) -> Self {
        self.expire_after = expire_after;
        self
    }

    /// Get the storage backend
    pub fn backend(&self) -> CacheBackend {
        self.backend
    }

    /// Get the cache file path (empty for the memory backend)
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if this cache is persisted to disk
    pub fn is_persistent(&self) -> bool {
        self.backend == CacheBackend::File
    }

    /// Look up a response. Expired entries are dropped and count as misses.
    pub async fn get(&self, key: &str) -> Option<CachedResponse> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(self.expire_after) => {
                    return Some(entry.clone());
                }
                Some(_) => {}
            }
        }

        // An insert may have refreshed the entry since the read lock was released
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired(self.expire_after) => Some(entry.clone()),
            Some(_) => {
                debug!(key, "Cache entry expired");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a response, persisting it immediately for the file backend
    pub async fn insert(&self, key: impl Into<String>, response: CachedResponse) -> Result<()> {
        {
            let mut entries = self.entries.write().await;
            entries.insert(key.into(), response);
        }
        self.save().await
    }

    /// Number of stored entries (including expired ones not yet evicted)
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop expired entries, returning how many were removed
    pub async fn remove_expired(&self) -> Result<usize> {
        let removed = {
            let mut entries = self.entries.write().await;
            let before = entries.len();
            entries.retain(|_, entry| !entry.is_expired(self.expire_after));
            before - entries.len()
        };
        if removed > 0 {
            debug!(removed, "Dropped expired cache entries");
            self.save().await?;
        }
        Ok(removed)
    }

    /// Remove every entry
    pub async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        info!(path = %self.path.display(), "Cleared response cache");
        self.save().await
    }

    /// Drop expired entries and write the rest to disk (no-op on disk for
    /// the memory backend)
    pub async fn flush(&self) -> Result<()> {
        match self.remove_expired().await? {
            0 => self.save().await,
            _ => Ok(()),
        }
    }

    /// Save current entries to file
    async fn save(&self) -> Result<()> {
        if !self.is_persistent() {
            return Ok(());
        }

        let contents = {
            let entries = self.entries.read().await;
            encode(&CacheFile {
                version: 1,
                entries: entries.clone(),
            })?
        };

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::cache(format!("Failed to write cache file: {e}")))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::cache(format!("Failed to rename cache file: {e}")))?;

        Ok(())
    }
}

fn encode(file: &CacheFile) -> Result<String> {
    serde_json::to_string(file).map_err(|e| Error::cache(format!("Failed to serialize cache: {e}")))
}

/// File path for a cache name, adding `.json` unless an extension is present
pub(super) fn cache_path(name: &str) -> PathBuf {
    let path = PathBuf::from(name);
    if path.extension().is_some() {
        path
    } else {
        path.with_extension("json")
    }
}

