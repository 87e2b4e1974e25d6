//! HTTP layer
//!
//! Turns operation calls into HTTP requests and responses into rows.
//!
//! # Features
//!
//! - **Request Preparation**: Argument validation and URL/query rendering
//! - **Transport Seam**: Pluggable [`Transport`] with a reqwest implementation
//! - **Rate Limiting**: Optional token bucket limiter using governor
//! - **Caching**: Successful responses are served from a [`crate::cache::ResponseCache`]

mod client;
mod executor;
mod rate_limit;
mod request;
mod transport;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use executor::HttpExecutor;
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use request::{build_request, join_url, PreparedRequest};
pub use transport::{CountingTransport, RawResponse, Transport};
