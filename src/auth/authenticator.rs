//! Authenticator implementation
//!
//! Applies the configured credential to prepared requests.

use super::types::{AuthConfig, Location};
use crate::http::PreparedRequest;

/// Authenticator handles applying authentication to requests
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    config: AuthConfig,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Get the auth configuration
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Apply authentication to a request
    pub fn apply(&self, mut req: PreparedRequest) -> PreparedRequest {
        match &self.config {
            AuthConfig::None => req,

            AuthConfig::ApiKey {
                location,
                name,
                value,
            } => {
                match location {
                    Location::Header => req.headers.push((name.clone(), value.clone())),
                    Location::Query => req.push_query(name.clone(), value.clone()),
                }
                req
            }
        }
    }

    /// Parameters that must not take part in cache keys
    pub fn secret_query_params(&self) -> Vec<&str> {
        self.config.query_param().into_iter().collect()
    }
}
