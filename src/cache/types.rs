//! Cache entry types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One cached response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// HTTP status of the original response
    pub status: u16,
    /// Raw response body
    pub body: String,
    /// When the response was stored
    pub stored_at: DateTime<Utc>,
}

impl CachedResponse {
    /// Create an entry stamped with the current time
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            stored_at: Utc::now(),
        }
    }

    /// Check whether the entry is older than `ttl`
    pub fn is_expired(&self, ttl: Option<Duration>) -> bool {
        match ttl {
            Some(ttl) => Utc::now() - self.stored_at >= ttl,
            None => false,
        }
    }
}

/// On-disk layout of the file backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheFile {
    /// Format version
    #[serde(default = "default_version")]
    pub version: u32,
    /// Entries keyed by resolved request
    #[serde(default)]
    pub entries: BTreeMap<String, CachedResponse>,
}

fn default_version() -> u32 {
    1
}

impl CacheFile {
    pub fn new() -> Self {
        Self {
            version: default_version(),
            entries: BTreeMap::new(),
        }
    }
}
