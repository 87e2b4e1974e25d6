//! Request preparation
//!
//! Turns an operation descriptor and caller arguments into a fully-resolved
//! request. Validation happens here, before anything touches the network.

use crate::args::Arguments;
use crate::error::{Error, Result};
use crate::schema::OperationDescriptor;
use crate::template::render_path;
use crate::types::{Method, ParamLocation};
use std::collections::HashMap;
use url::Url;

/// A fully-resolved request, ready to hand to a transport
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// HTTP method
    pub method: Method,
    /// URL without query string
    pub url: Url,
    /// Query parameters, sorted by name
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: Vec<(String, String)>,
}

impl PreparedRequest {
    /// Create a new request with no parameters
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    /// Add a query parameter, keeping the list sorted
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_query(key, value);
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub(crate) fn push_query(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let at = self.query.partition_point(|(k, _)| *k <= key);
        self.query.insert(at, (key, value.into()));
    }

    /// Look up a header value (case-insensitive)
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// URL including the query string
    pub fn full_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        url
    }

    /// Cache key: method plus canonical URL, leaving out the named query
    /// parameters (used for credentials), then the headers sorted by
    /// lower-cased name.
    ///
    /// Must be taken before the authenticator attaches its header.
    pub fn cache_key(&self, exclude: &[&str]) -> String {
        let mut url = self.url.clone();
        let kept: Vec<_> = self
            .query
            .iter()
            .filter(|(k, _)| !exclude.contains(&k.as_str()))
            .collect();
        if !kept.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        let mut headers: Vec<(String, &str)> = self
            .headers
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.as_str()))
            .collect();
        headers.sort_unstable();

        let mut key = format!("{} {}", self.method, url);
        for (name, value) in headers {
            key.push_str(&format!("\n{name}: {value}"));
        }
        key
    }
}

/// Build a request for an operation.
///
/// Fails with [`Error::Argument`] when a required parameter is missing, an
/// undeclared one is present, or a datetime value cannot be parsed.
pub fn build_request(
    base_url: &Url,
    descriptor: &OperationDescriptor,
    args: &Arguments,
) -> Result<PreparedRequest> {
    let op = descriptor.name.as_str();

    let unexpected: Vec<&str> = args
        .names()
        .filter(|name| descriptor.parameter(name).is_none())
        .collect();
    if !unexpected.is_empty() {
        return Err(Error::unexpected_argument(op, &unexpected));
    }

    if let Some(missing) = descriptor
        .required_parameters()
        .find(|p| !args.contains(&p.name))
    {
        return Err(Error::missing_argument(op, &missing.name));
    }

    let mut path_values = HashMap::new();
    let mut query = Vec::new();
    let mut headers = Vec::new();

    for param in &descriptor.parameters {
        let Some(value) = args.get(&param.name) else {
            continue;
        };
        let rendered = value
            .render_for(param.kind)
            .map_err(|e| Error::argument(op, format!("parameter '{}': {e}", param.name)))?;

        match param.location {
            ParamLocation::Path => {
                path_values.insert(param.name.clone(), rendered);
            }
            ParamLocation::Query => query.push((param.name.clone(), rendered)),
            ParamLocation::Header => headers.push((param.name.clone(), rendered)),
        }
    }

    let path = render_path(&descriptor.path, &path_values)?;
    let url = join_url(base_url, &path)?;

    let mut request = PreparedRequest::new(descriptor.method, url);
    for (k, v) in query {
        request.push_query(k, v);
    }
    request.headers = headers;
    Ok(request)
}

/// Append a path to the base URL, keeping any path prefix on the base
pub fn join_url(base_url: &Url, path: &str) -> Result<Url> {
    let base = base_url.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Ok(Url::parse(&format!("{base}/{path}"))?)
}
