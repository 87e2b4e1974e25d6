//! The ISOStream client

use super::config::{CallOptions, ClientConfig, ClientConfigBuilder};
use super::methods::MethodRegistry;
use super::range::RangeRequest;
use crate::args::Arguments;
use crate::auth::Authenticator;
use crate::cache::ResponseCache;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, HttpExecutor, Transport};
use crate::schema::{
    bundled_schema, fetch_schema, load_schema, ApiSchema, OperationDescriptor, SchemaSource,
};
use crate::table::{format_rows, Table};
use crate::types::JsonObject;
use futures::{stream, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of a call: a table, or the raw rows
#[derive(Debug, Clone)]
pub enum CallOutput {
    Table(Table),
    Rows(Vec<JsonObject>),
}

impl CallOutput {
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            CallOutput::Table(t) => Some(t),
            CallOutput::Rows(_) => None,
        }
    }

    pub fn as_rows(&self) -> Option<&[JsonObject]> {
        match self {
            CallOutput::Rows(r) => Some(r),
            CallOutput::Table(_) => None,
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            CallOutput::Table(t) => Some(t),
            CallOutput::Rows(_) => None,
        }
    }

    pub fn into_rows(self) -> Option<Vec<JsonObject>> {
        match self {
            CallOutput::Rows(r) => Some(r),
            CallOutput::Table(_) => None,
        }
    }

    /// Number of rows in the output
    pub fn len(&self) -> usize {
        match self {
            CallOutput::Table(t) => t.num_rows(),
            CallOutput::Rows(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// ISOStream API client.
///
/// Methods come from the interface description and are invoked by name:
///
/// ```no_run
/// # async fn example() -> isostream::Result<()> {
/// use isostream::{Arguments, CallOptions, IsoStream};
///
/// let client = IsoStream::new("my-api-key").await?;
/// let args = Arguments::new()
///     .arg("iso", "ercot")
///     .arg("nodes", "HB_NORTH")
///     .arg("start", "2022-01-01")
///     .arg("end", "2022-01-02");
/// let table = client.call_table("dalmp_node", &args, true).await?;
/// println!("{table}");
/// # Ok(())
/// # }
/// ```
pub struct IsoStream {
    config: ClientConfig,
    schema: Arc<ApiSchema>,
    registry: MethodRegistry,
    executor: HttpExecutor,
}

impl IsoStream {
    /// Client with default settings (bundled schema, file cache)
    pub async fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(api_key)).await
    }

    /// Start building a client
    pub fn builder(api_key: impl Into<String>) -> ClientConfigBuilder {
        ClientConfig::builder(api_key)
    }

    /// Client from an explicit configuration, sending over reqwest
    pub async fn with_config(config: ClientConfig) -> Result<Self> {
        let mut http = HttpClientConfig::builder()
            .timeout(config.timeout)
            .maybe_rate_limit(config.rate_limit.clone());
        if let Some(agent) = &config.user_agent {
            http = http.user_agent(agent.clone());
        }
        let client = HttpClient::with_config(http.build())?;
        Self::with_transport(config, Arc::new(client)).await
    }

    /// Client over a custom transport
    pub async fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let base_url = config.base_url()?;

        let cache = if config.use_cache {
            Some(ResponseCache::open(
                config.cache_backend,
                &config.cache_name,
                config.expire_after,
            )?)
        } else {
            None
        };

        let executor = HttpExecutor::new(transport, base_url, Authenticator::new(config.auth()))
            .with_cache(cache)
            .with_verbose(config.verbose);

        let schema = match &config.schema {
            SchemaSource::Bundled => bundled_schema()?,
            SchemaSource::File(path) => load_schema(path)?,
            SchemaSource::Remote => fetch_schema(&executor).await?,
        };
        let registry = MethodRegistry::build(&schema);

        info!(
            host = %config.host,
            methods = registry.len(),
            version = schema.version(),
            cache = config.use_cache,
            "ISOStream client ready"
        );

        Ok(Self {
            config,
            schema: Arc::new(schema),
            registry,
            executor,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn schema(&self) -> &ApiSchema {
        &self.schema
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    /// The response cache, when caching is on
    pub fn cache(&self) -> Option<&ResponseCache> {
        self.executor.cache()
    }

    // ========================================================================
    // Discovery
    // ========================================================================

    /// Available method names, sorted, optionally filtered by a
    /// case-insensitive substring
    pub fn api_methods(&self, filter: Option<&str>) -> Vec<String> {
        self.registry.names(filter)
    }

    /// Parameter documentation for a method
    pub fn describe(&self, name: &str) -> Option<String> {
        self.registry.describe(name)
    }

    // ========================================================================
    // Calls
    // ========================================================================

    /// Call a method by name
    pub async fn call(
        &self,
        name: &str,
        args: &Arguments,
        options: CallOptions,
    ) -> Result<CallOutput> {
        self.registry.resolve(name)?.call(self, args, options).await
    }

    /// Call a method and return the raw rows
    pub async fn call_rows(&self, name: &str, args: &Arguments) -> Result<Vec<JsonObject>> {
        let method = self.registry.resolve(name)?;
        self.executor.execute(method.descriptor(), args).await
    }

    /// Call a method and return a table
    pub async fn call_table(&self, name: &str, args: &Arguments, pivot: bool) -> Result<Table> {
        let method = self.registry.resolve(name)?;
        let rows = self.executor.execute(method.descriptor(), args).await?;
        format_rows(&rows, method.descriptor(), pivot)
    }

    pub(crate) async fn invoke(
        &self,
        descriptor: &OperationDescriptor,
        args: &Arguments,
        options: CallOptions,
    ) -> Result<CallOutput> {
        let rows = self.executor.execute(descriptor, args).await?;
        shape_output(rows, descriptor, options)
    }

    /// Call a method once per time window and combine the rows.
    ///
    /// Windows run one after another. A window with no data contributes no
    /// rows; if no window has data the call fails with
    /// [`Error::EmptyResult`].
    pub async fn fetch_range(
        &self,
        name: &str,
        args: &Arguments,
        range: &RangeRequest,
        options: CallOptions,
    ) -> Result<CallOutput> {
        let method = self.registry.resolve(name)?;
        let descriptor = method.descriptor();
        let windows = range.windows(name)?;
        let total = windows.len();

        let rows: Vec<JsonObject> = stream::iter(windows)
            .then(|(start, end)| {
                let args = range.window_args(args, start, end);
                async move {
                    match self.executor.execute(descriptor, &args).await {
                        Ok(rows) => Ok(rows),
                        Err(Error::EmptyResult { .. }) => {
                            debug!(operation = name, %start, %end, "Window returned no rows");
                            Ok(Vec::new())
                        }
                        Err(e) => Err(e),
                    }
                }
            })
            .try_concat()
            .await?;

        debug!(operation = name, windows = total, rows = rows.len(), "Fetched range");
        if rows.is_empty() {
            return Err(Error::empty_result(name));
        }
        shape_output(rows, descriptor, options)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Write cached responses to disk
    pub async fn flush(&self) -> Result<()> {
        match self.cache() {
            Some(cache) => cache.flush().await,
            None => Ok(()),
        }
    }

    /// Flush and release the client
    pub async fn close(self) -> Result<()> {
        self.flush().await
    }
}

impl std::fmt::Debug for IsoStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IsoStream")
            .field("config", &self.config)
            .field("methods", &self.registry.len())
            .finish_non_exhaustive()
    }
}

fn shape_output(
    rows: Vec<JsonObject>,
    descriptor: &OperationDescriptor,
    options: CallOptions,
) -> Result<CallOutput> {
    if options.as_table {
        Ok(CallOutput::Table(format_rows(&rows, descriptor, options.pivot)?))
    } else {
        Ok(CallOutput::Rows(rows))
    }
}
