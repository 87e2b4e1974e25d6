//! Client facade
//!
//! [`IsoStream`] owns the configuration, interface description, method
//! registry, executor and cache, and exposes every API operation by name.

mod config;
mod facade;
mod methods;
mod range;

pub use config::{CallOptions, ClientConfig, ClientConfigBuilder, DEFAULT_HOST};
pub use facade::{CallOutput, IsoStream};
pub use methods::{ApiMethod, MethodRegistry};
pub use range::RangeRequest;

#[cfg(test)]
mod tests;
