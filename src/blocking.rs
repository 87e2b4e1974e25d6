//! Blocking client
//!
//! The same API as [`crate::IsoStream`], for callers without an async
//! runtime. Each call blocks the current thread on a private
//! current-thread runtime.
//!
//! ```no_run
//! use isostream::blocking::IsoStream;
//! use isostream::Arguments;
//!
//! let client = IsoStream::new("my-api-key")?;
//! let rows = client.call_rows(
//!     "fuelmix",
//!     &Arguments::new()
//!         .arg("iso", "caiso")
//!         .arg("start", "2022-06-01")
//!         .arg("end", "2022-06-02"),
//! )?;
//! # Ok::<(), isostream::Error>(())
//! ```
//!
//! Do not use it from inside an async context; blocking on a runtime from
//! within another runtime panics.

use crate::args::Arguments;
use crate::client::{self, CallOptions, CallOutput, ClientConfig, RangeRequest};
use crate::error::{Result, ResultExt};
use crate::http::Transport;
use crate::schema::ApiSchema;
use crate::table::Table;
use crate::types::JsonObject;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Blocking ISOStream API client
pub struct IsoStream {
    inner: client::IsoStream,
    runtime: Runtime,
}

impl IsoStream {
    /// Client with default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(api_key))
    }

    /// Client from an explicit configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let runtime = build_runtime()?;
        let inner = runtime.block_on(client::IsoStream::with_config(config))?;
        Ok(Self { inner, runtime })
    }

    /// Client over a custom transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let runtime = build_runtime()?;
        let inner = runtime.block_on(client::IsoStream::with_transport(config, transport))?;
        Ok(Self { inner, runtime })
    }

    /// The async client this wraps
    pub fn inner(&self) -> &client::IsoStream {
        &self.inner
    }

    pub fn schema(&self) -> &ApiSchema {
        self.inner.schema()
    }

    pub fn api_methods(&self, filter: Option<&str>) -> Vec<String> {
        self.inner.api_methods(filter)
    }

    pub fn describe(&self, name: &str) -> Option<String> {
        self.inner.describe(name)
    }

    /// Call a method by name
    pub fn call(&self, name: &str, args: &Arguments, options: CallOptions) -> Result<CallOutput> {
        self.runtime.block_on(self.inner.call(name, args, options))
    }

    pub fn call_rows(&self, name: &str, args: &Arguments) -> Result<Vec<JsonObject>> {
        self.runtime.block_on(self.inner.call_rows(name, args))
    }

    pub fn call_table(&self, name: &str, args: &Arguments, pivot: bool) -> Result<Table> {
        self.runtime.block_on(self.inner.call_table(name, args, pivot))
    }

    /// Call a method once per time window and combine the rows
    pub fn fetch_range(
        &self,
        name: &str,
        args: &Arguments,
        range: &RangeRequest,
        options: CallOptions,
    ) -> Result<CallOutput> {
        self.runtime
            .block_on(self.inner.fetch_range(name, args, range, options))
    }

    /// Number of cached responses (zero when caching is off)
    pub fn cached_responses(&self) -> usize {
        match self.inner.cache() {
            Some(cache) => self.runtime.block_on(cache.len()),
            None => 0,
        }
    }

    pub fn flush(&self) -> Result<()> {
        self.runtime.block_on(self.inner.flush())
    }

    /// Flush and release the client
    pub fn close(self) -> Result<()> {
        let Self { inner, runtime } = self;
        runtime.block_on(inner.close())
    }
}

impl std::fmt::Debug for IsoStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IsoStream").field("inner", &self.inner).finish()
    }
}

fn build_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")
}
