//! CLI module
//!
//! Command-line interface over the client.
//!
//! # Commands
//!
//! - `methods` - List method names, optionally filtered
//! - `describe` - Print one method's documentation
//! - `call` - Call a method and print or save the result
//! - `cache` - Clear or inspect the response cache

mod commands;
mod runner;


pub use commands::{CacheAction, Cli, Commands, OutputFormat};
pub use runner::Runner;
