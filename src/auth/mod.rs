//! Authentication module
//!
//! ISOStream authenticates every call with an API key, sent either as a
//! header (the default) or as the `api_key` query parameter.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, Location, DEFAULT_HEADER, DEFAULT_QUERY_PARAM};
