//! Response cache module
//!
//! Keeps raw API responses keyed by the fully-resolved request, so repeated
//! identical calls are served without network I/O.
//!
//! # Overview
//!
//! The cache module provides:
//! - `ResponseCache` - Keyed store owned by one client
//! - `CacheBackend::File` - JSON file in the working directory, written atomically
//! - `CacheBackend::Memory` - In-process map, gone when the client is dropped
//! - Optional expiry of old entries

mod store;
mod types;

pub use store::{ResponseCache, DEFAULT_CACHE_NAME};
pub use types::{CacheFile, CachedResponse};
