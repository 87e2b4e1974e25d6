//! Client configuration

use super::facade::IsoStream;
use crate::auth::{AuthConfig, Location};
use crate::cache::DEFAULT_CACHE_NAME;
use crate::error::{Error, Result};
use crate::http::RateLimiterConfig;
use crate::schema::SchemaSource;
use crate::types::{CacheBackend, OptionStringExt};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Production API host
pub const DEFAULT_HOST: &str = "https://app.isostream.io/api";

/// Everything needed to construct a client
#[derive(Clone)]
pub struct ClientConfig {
    /// ISOStream API key
    pub api_key: String,
    /// API base URL
    pub host: String,
    /// Where the interface description comes from
    pub schema: SchemaSource,
    /// Serve repeat calls from the response cache
    pub use_cache: bool,
    pub cache_backend: CacheBackend,
    /// Cache name; the file backend stores `{cache_name}.json`
    pub cache_name: String,
    /// Cached responses older than this are refetched
    pub expire_after: Option<chrono::Duration>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Optional client-side throttle
    pub rate_limit: Option<RateLimiterConfig>,
    /// Where the API key travels
    pub auth_location: Location,
    /// Overrides the default user agent
    pub user_agent: Option<String>,
    /// Log every request URL at info level
    pub verbose: bool,
}

impl ClientConfig {
    /// Start building a config for the given API key
    pub fn builder(api_key: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::new(api_key)
    }

    /// Defaults for the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            host: DEFAULT_HOST.to_string(),
            schema: SchemaSource::default(),
            use_cache: true,
            cache_backend: CacheBackend::default(),
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            expire_after: None,
            timeout: Duration::from_secs(30),
            rate_limit: None,
            auth_location: Location::default(),
            user_agent: None,
            verbose: false,
        }
    }

    /// Parsed API base URL
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(self.host.trim())
            .map_err(|e| Error::config(format!("Invalid host '{}': {e}", self.host)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "Host must be an http(s) URL, got '{}'",
                self.host
            )));
        }
        Ok(url)
    }

    /// Authentication derived from the key and its location
    pub fn auth(&self) -> AuthConfig {
        AuthConfig::api_key_at(self.auth_location, self.api_key.clone())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"***")
            .field("host", &self.host)
            .field("schema", &self.schema)
            .field("use_cache", &self.use_cache)
            .field("cache_backend", &self.cache_backend)
            .field("cache_name", &self.cache_name)
            .field("expire_after", &self.expire_after)
            .field("timeout", &self.timeout)
            .field("rate_limit", &self.rate_limit)
            .field("auth_location", &self.auth_location)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            config: ClientConfig::new(api_key),
        }
    }

    /// Set the API base URL
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Choose the interface description source
    pub fn schema(mut self, source: SchemaSource) -> Self {
        self.config.schema = source;
        self
    }

    /// Enable or disable the response cache
    pub fn use_cache(mut self, enabled: bool) -> Self {
        self.config.use_cache = enabled;
        self
    }

    pub fn cache_backend(mut self, backend: CacheBackend) -> Self {
        self.config.cache_backend = backend;
        self
    }

    pub fn cache_name(mut self, name: impl Into<String>) -> Self {
        self.config.cache_name = name.into();
        self
    }

    /// Expire cached responses after the given age
    pub fn expire_after(mut self, ttl: chrono::Duration) -> Self {
        self.config.expire_after = Some(ttl);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Send the API key as a header or as the `api_key` query parameter
    pub fn auth_location(mut self, location: Location) -> Self {
        self.config.auth_location = location;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into().none_if_empty();
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Validate and build the config
    pub fn build(self) -> Result<ClientConfig> {
        let config = self.config;

        config.base_url()?;
        if config.use_cache && config.cache_name.trim().is_empty() {
            return Err(Error::config("Cache name must not be empty"));
        }
        if config.timeout.is_zero() {
            return Err(Error::config("Timeout must be greater than zero"));
        }

        Ok(config)
    }

    /// Build the config and construct a client with it
    pub async fn connect(self) -> Result<IsoStream> {
        IsoStream::with_config(self.build()?).await
    }
}

/// Per-call output options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOptions {
    /// Return a table rather than raw rows
    pub as_table: bool,
    /// Pivot the table when the operation has pivot metadata
    pub pivot: bool,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            as_table: true,
            pivot: true,
        }
    }
}

impl CallOptions {
    /// Raw JSON rows
    pub fn raw() -> Self {
        Self {
            as_table: false,
            pivot: false,
        }
    }

    /// Row-oriented table
    pub fn no_pivot() -> Self {
        Self {
            as_table: true,
            pivot: false,
        }
    }
}
