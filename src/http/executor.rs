//! Request execution
//!
//! Runs prepared requests through the response cache, the authenticator and
//! the transport, then maps the outcome onto the crate's error types.

use super::request::{build_request, join_url, PreparedRequest};
use super::transport::{RawResponse, Transport};
use crate::args::Arguments;
use crate::auth::Authenticator;
use crate::cache::{CachedResponse, ResponseCache};
use crate::error::{Error, Result};
use crate::schema::OperationDescriptor;
use crate::types::{JsonObject, JsonValue, Method};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Executes API operations against one host
#[derive(Clone)]
pub struct HttpExecutor {
    transport: Arc<dyn Transport>,
    base_url: Url,
    auth: Authenticator,
    cache: Option<ResponseCache>,
    verbose: bool,
}

impl HttpExecutor {
    /// Create an executor without a response cache
    pub fn new(transport: Arc<dyn Transport>, base_url: Url, auth: Authenticator) -> Self {
        Self {
            transport,
            base_url,
            auth,
            cache: None,
            verbose: false,
        }
    }

    /// Attach a response cache
    #[must_use]
    pub fn with_cache(mut self, cache: Option<ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Log every request URL at info level
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.auth
    }

    /// Run an operation and return its rows.
    ///
    /// Arguments are validated before any request is sent. An empty result
    /// set is reported as [`Error::EmptyResult`].
    pub async fn execute(
        &self,
        descriptor: &OperationDescriptor,
        args: &Arguments,
    ) -> Result<Vec<JsonObject>> {
        let request = build_request(&self.base_url, descriptor, args)?;
        let body = self.fetch(&descriptor.name, request).await?;
        let rows = decode_rows(&body)?;
        if rows.is_empty() {
            return Err(Error::empty_result(&descriptor.name));
        }
        Ok(rows)
    }

    /// GET a JSON document relative to the base URL (no caching)
    pub async fn get_json(&self, path: &str) -> Result<JsonValue> {
        let url = join_url(&self.base_url, path)?;
        let request = self.auth.apply(PreparedRequest::new(Method::GET, url));
        let response = self.transport.send(&request).await?;
        let body = check_status(response)?;
        serde_json::from_str(&body)
            .map_err(|e| Error::decode(format!("{path} is not valid JSON: {e}")))
    }

    /// Send a request, consulting the cache first. Returns the body of a
    /// successful response.
    pub async fn fetch(&self, operation: &str, request: PreparedRequest) -> Result<String> {
        // Keyed before the credential is attached
        let key = request.cache_key(&self.auth.secret_query_params());

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&key).await {
                debug!(operation, key = %key, "Cache hit");
                return check_status(RawResponse::new(hit.status, hit.body));
            }
        }

        // Logged before the credential is attached
        if self.verbose {
            info!(operation, url = %request.full_url(), "Sending request");
        } else {
            debug!(operation, url = %request.url, "Sending request");
        }
        let request = self.auth.apply(request);
        let response = self.transport.send(&request).await?;

        if response.is_success() {
            if let Some(cache) = &self.cache {
                let entry = CachedResponse::new(response.status, response.body.clone());
                if let Err(e) = cache.insert(key, entry).await {
                    warn!(operation, error = %e, "Failed to store response in cache");
                }
            }
        }

        check_status(response)
    }
}

impl std::fmt::Debug for HttpExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpExecutor")
            .field("base_url", &self.base_url.as_str())
            .field("auth", self.auth.config())
            .field("cache", &self.cache.as_ref().map(ResponseCache::backend))
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Response Handling
// ============================================================================

/// Map non-2xx responses to errors, returning the body otherwise
fn check_status(response: RawResponse) -> Result<String> {
    if response.is_success() {
        return Ok(response.body);
    }
    let message = error_message(&response.body);
    match response.status {
        401 | 403 => Err(Error::auth(response.status, message)),
        status => Err(Error::api(status, message, response.body)),
    }
}

/// Extract a readable message from an error body.
///
/// Validation errors carry a `detail` list of `{loc, msg}` objects, which
/// become `parameter 'name': msg` joined by commas. A string `detail` is used
/// as-is. Anything else falls back to the raw body.
pub(crate) fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<JsonValue>(body) else {
        return body.to_string();
    };

    match value.get("detail") {
        Some(JsonValue::String(detail)) => detail.clone(),
        Some(JsonValue::Array(items)) => {
            let parts: Option<Vec<String>> = items
                .iter()
                .map(|item| {
                    let name = item.get("loc")?.as_array()?.last()?;
                    let name = match name {
                        JsonValue::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    let msg = item.get("msg")?.as_str()?;
                    Some(format!("parameter '{name}': {msg}"))
                })
                .collect();
            match parts {
                Some(parts) if !parts.is_empty() => parts.join(","),
                _ => body.to_string(),
            }
        }
        _ => body.to_string(),
    }
}

/// Decode a response body into rows
pub(crate) fn decode_rows(body: &str) -> Result<Vec<JsonObject>> {
    let value: JsonValue = serde_json::from_str(body)
        .map_err(|e| Error::decode(format!("response is not valid JSON: {e}")))?;

    let JsonValue::Array(items) = value else {
        return Err(Error::decode(format!(
            "expected a JSON array of records, got {}",
            type_name(&value)
        )));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            JsonValue::Object(obj) => Ok(obj),
            other => Err(Error::decode(format!(
                "record {i} is {}, expected an object",
                type_name(&other)
            ))),
        })
        .collect()
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
