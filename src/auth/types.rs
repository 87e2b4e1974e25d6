//! Auth configuration types

use serde::{Deserialize, Serialize};

/// Header used when the key travels as a header
pub const DEFAULT_HEADER: &str = "X-API-Key";

/// Query parameter used when the key travels in the URL
pub const DEFAULT_QUERY_PARAM: &str = "api_key";

/// Location for API key placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// Place in HTTP header
    #[default]
    Header,
    /// Place in query parameter
    Query,
}

/// Authentication configuration
#[derive(Clone, Default, PartialEq, Eq)]
pub enum AuthConfig {
    /// No authentication (e.g. fetching a public interface description)
    #[default]
    None,

    /// API Key authentication (header or query)
    ApiKey {
        /// Where to place the API key
        location: Location,
        /// Header or query parameter name
        name: String,
        /// The API key value
        value: String,
    },
}

impl AuthConfig {
    /// API key sent in the default header
    pub fn api_key(value: impl Into<String>) -> Self {
        Self::api_key_at(Location::Header, value)
    }

    /// API key sent at the given location under its default name
    pub fn api_key_at(location: Location, value: impl Into<String>) -> Self {
        let name = match location {
            Location::Header => DEFAULT_HEADER,
            Location::Query => DEFAULT_QUERY_PARAM,
        };
        AuthConfig::ApiKey {
            location,
            name: name.to_string(),
            value: value.into(),
        }
    }

    /// Query parameter carrying the credential, if any
    pub fn query_param(&self) -> Option<&str> {
        match self {
            AuthConfig::ApiKey {
                location: Location::Query,
                name,
                ..
            } => Some(name),
            _ => None,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthConfig::None => write!(f, "None"),
            AuthConfig::ApiKey { location, name, .. } => f
                .debug_struct("ApiKey")
                .field("location", location)
                .field("name", name)
                .field("value", &"***")
                .finish(),
        }
    }
}
