// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # isostream
//!
//! Client for the ISOStream electricity market data API.
//!
//! The callable methods are not hand-written: they are generated at runtime
//! from the API's OpenAPI document, so a new endpoint on the server is a new
//! method on the client without a release.
//!
//! ## Features
//!
//! - **Schema-driven methods**: one method per GET operation, with docs built
//!   from the parameter descriptions
//! - **Argument checking**: required, unexpected and malformed arguments fail
//!   before any request is sent
//! - **Response cache**: identical requests are answered locally, in memory
//!   or from a JSON file that survives restarts
//! - **Arrow tables**: responses become typed `RecordBatch`es, pivoted wide
//!   when the operation declares a layout
//! - **Parquet output** for anything you fetch
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use isostream::{Arguments, IsoStream, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = IsoStream::new("my-api-key").await?;
//!
//!     // What can I call?
//!     for name in client.api_methods(Some("lmp")) {
//!         println!("{name}");
//!     }
//!
//!     let args = Arguments::new()
//!         .arg("iso", "pjm")
//!         .arg("nodes", "WESTERN HUB,EASTERN HUB")
//!         .arg("start", "2021-01-01")
//!         .arg("end", "2021-01-02");
//!     let table = client.call_table("dalmp_node", &args, true).await?;
//!     println!("{table}");
//!
//!     client.close().await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         IsoStream facade                         │
//! │  api_methods()   describe()   call()   fetch_range()   close()   │
//! └──────────────────────────────────────────────────────────────────┘
//!                                 │
//! ┌───────────┬──────────────┬────┴──────┬──────────────┬────────────┐
//! │  Schema   │   Request    │   Cache   │    Table     │   Output   │
//! ├───────────┼──────────────┼───────────┼──────────────┼────────────┤
//! │ OpenAPI   │ Arg checks   │ Memory    │ Inference    │ JSON rows  │
//! │ Naming    │ Auth         │ JSON file │ Pivot        │ Parquet    │
//! │ Registry  │ Rate limit   │ Expiry    │ Arrow batch  │            │
//! └───────────┴──────────────┴───────────┴──────────────┴────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: Document the table and schema modules before 1.0

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Timestamp parsing and formatting
pub mod timestamp;

/// Path templates and method naming
pub mod template;

/// Call arguments
pub mod args;

/// API key authentication
pub mod auth;

/// Request building, transport and execution
pub mod http;

/// Response cache
pub mod cache;

/// OpenAPI loading and operation descriptors
pub mod schema;

/// Arrow tables built from response rows
pub mod table;

/// Async client facade and method registry
pub mod client;

/// Blocking wrapper around the async client
pub mod blocking;

/// JSON and Parquet output
pub mod output;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result, ResultExt};
pub use types::*;

// Re-export commonly used types
pub use args::{ArgValue, Arguments};
pub use client::{
    ApiMethod, CallOptions, CallOutput, ClientConfig, IsoStream, MethodRegistry, RangeRequest,
    DEFAULT_HOST,
};
pub use schema::{ApiSchema, OperationDescriptor, SchemaSource};
pub use table::{Table, TableLayout};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
