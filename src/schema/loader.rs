//! Interface description loading
//!
//! Accepts JSON or YAML documents, from the copy bundled with the crate or
//! from a file. Any failure is a configuration error; nothing is partially
//! loaded.

use super::openapi::parse_document;
use super::types::ApiSchema;
use crate::error::{Error, Result};
use crate::http::HttpExecutor;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Interface description shipped with this release
pub static BUNDLED_SCHEMA: &str = include_str!("../../schemas/isostream.openapi.json");

/// Where the client reads its interface description from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SchemaSource {
    /// The document bundled with the crate
    #[default]
    Bundled,
    /// A local JSON or YAML file
    File(PathBuf),
    /// `GET {host}/openapi.json` at construction time
    Remote,
}

/// Load the bundled interface description
pub fn bundled_schema() -> Result<ApiSchema> {
    load_schema_from_str(BUNDLED_SCHEMA)
}

/// Load an interface description from a file path
pub fn load_schema(path: impl AsRef<Path>) -> Result<ApiSchema> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::config(format!(
                "Interface description '{}' not found",
                path.display()
            ))
        } else {
            Error::config(format!(
                "Failed to read interface description '{}': {}",
                path.display(),
                e
            ))
        }
    })?;
    load_schema_from_str(&content)
}

/// Load an interface description from a JSON or YAML string
pub fn load_schema_from_str(content: &str) -> Result<ApiSchema> {
    let doc = parse_str(content)?;
    load_schema_from_value(&doc)
}

/// Load an interface description that has already been parsed
pub fn load_schema_from_value(doc: &Value) -> Result<ApiSchema> {
    if !doc.is_object() {
        return Err(Error::config("Interface description must be an object"));
    }
    parse_document(doc)
}

fn parse_str(content: &str) -> Result<Value> {
    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return Err(Error::config("Interface description is empty"));
    }
    if trimmed.starts_with('{') {
        serde_json::from_str(trimmed)
            .map_err(|e| Error::config(format!("Failed to parse interface JSON: {e}")))
    } else {
        serde_yaml::from_str(trimmed)
            .map_err(|e| Error::config(format!("Failed to parse interface YAML: {e}")))
    }
}

/// Path of the interface description on the API host
pub const REMOTE_SCHEMA_PATH: &str = "/openapi.json";

/// Fetch the interface description from the API host
pub async fn fetch_schema(executor: &HttpExecutor) -> Result<ApiSchema> {
    debug!(host = %executor.base_url(), "Fetching interface description");
    let doc = executor.get_json(REMOTE_SCHEMA_PATH).await?;
    load_schema_from_value(&doc)
}
