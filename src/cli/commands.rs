//! CLI commands and argument parsing

use crate::args::{ArgValue, Arguments};
use crate::types::CacheBackend;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line client for the isostream market data API
#[derive(Parser, Debug)]
#[command(name = "isostream")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API key sent with every data request
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// API host
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Interface description file (JSON or YAML) instead of the bundled one
    #[arg(long, global = true)]
    pub schema: Option<PathBuf>,

    /// Disable the response cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Cache backend (file or memory)
    #[arg(long, global = true, default_value = "file")]
    pub cache_backend: CacheBackend,

    /// Cache name; the file backend stores `{name}.json`
    #[arg(long, global = true)]
    pub cache_name: Option<String>,

    /// Verbose output (log every request URL)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the available API methods
    Methods {
        /// Only list methods whose name contains this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show the documentation for one method
    Describe {
        /// Method name
        name: String,
    },

    /// Call an API method
    Call {
        /// Method name
        name: String,

        /// Method argument as name=value (repeatable)
        #[arg(short = 'a', long = "arg", value_parser = parse_arg)]
        args: Vec<(String, ArgValue)>,

        /// Print the decoded JSON rows instead of a table
        #[arg(long)]
        raw: bool,

        /// Keep the row layout even when the method declares a pivot
        #[arg(long)]
        no_pivot: bool,

        /// Split the `start`/`end` arguments into windows of this many hours
        #[arg(long)]
        window_hours: Option<u32>,

        /// Write the table to a Parquet file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format for stdout
        #[arg(short, long, default_value = "pretty")]
        format: OutputFormat,
    },

    /// Manage the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

/// Cache subcommands
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum CacheAction {
    /// Remove every cached response
    Clear,
    /// Show where the cache lives and how many responses it holds
    Info,
}

/// Output format for call results
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per line
    Json,
    /// Aligned text table
    #[default]
    Pretty,
}

fn parse_arg(pair: &str) -> Result<(String, ArgValue), String> {
    Arguments::parse_pair(pair)
}

impl Commands {
    /// Collect `-a name=value` pairs into call arguments
    pub fn call_arguments(pairs: &[(String, ArgValue)]) -> Arguments {
        pairs.iter().cloned().collect()
    }
}
