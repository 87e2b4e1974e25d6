//! CLI runner - executes commands

use crate::args::{ArgValue, Arguments};
use crate::cache::{ResponseCache, DEFAULT_CACHE_NAME};
use crate::cli::commands::{CacheAction, Cli, Commands, OutputFormat};
use crate::client::{CallOptions, CallOutput, ClientConfig, IsoStream, RangeRequest};
use crate::error::{Error, Result, ResultExt};
use crate::output::write_table;
use crate::schema::SchemaSource;
use crate::table::Table;
use crate::timestamp::parse_timestamp;
use crate::types::{CacheBackend, JsonObject};
use std::path::Path;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Methods { filter } => self.methods(filter.as_deref()).await,
            Commands::Describe { name } => self.describe(name).await,
            Commands::Call {
                name,
                args,
                raw,
                no_pivot,
                window_hours,
                output,
                format,
            } => {
                let args = Commands::call_arguments(args);
                let options = CallOptions {
                    as_table: !*raw,
                    pivot: !*no_pivot,
                };
                self.call(name, &args, options, *window_hours, output.as_deref(), *format)
                    .await
            }
            Commands::Cache { action } => self.cache(*action).await,
        }
    }

    // ========================================================================
    // Client setup
    // ========================================================================

    /// Build the client configuration from global flags.
    ///
    /// Discovery commands never touch the network for data, so they run
    /// without a key and without opening the cache.
    fn config(&self, data_access: bool) -> Result<ClientConfig> {
        let api_key = match (&self.cli.api_key, data_access) {
            (Some(key), _) if !key.trim().is_empty() => key.clone(),
            (_, true) => return Err(Error::config("An API key is required (use --api-key)")),
            (_, false) => String::new(),
        };

        let mut builder = ClientConfig::builder(api_key)
            .use_cache(data_access && !self.cli.no_cache)
            .cache_backend(self.cli.cache_backend)
            .cache_name(self.cache_name())
            .verbose(self.cli.verbose);

        if let Some(host) = &self.cli.host {
            builder = builder.host(host.clone());
        }
        if let Some(path) = &self.cli.schema {
            builder = builder.schema(SchemaSource::File(path.clone()));
        }

        builder.build()
    }

    fn cache_name(&self) -> String {
        self.cli
            .cache_name
            .clone()
            .unwrap_or_else(|| DEFAULT_CACHE_NAME.to_string())
    }

    async fn client(&self, data_access: bool) -> Result<IsoStream> {
        IsoStream::with_config(self.config(data_access)?).await
    }

    // ========================================================================
    // Commands
    // ========================================================================

    async fn methods(&self, filter: Option<&str>) -> Result<()> {
        let client = self.client(false).await?;
        for name in client.api_methods(filter) {
            println!("{name}");
        }
        Ok(())
    }

    async fn describe(&self, name: &str) -> Result<()> {
        let client = self.client(false).await?;
        let docs = client
            .describe(name)
            .ok_or_else(|| Error::unknown_method(name))?;
        println!("{docs}");
        Ok(())
    }

    async fn call(
        &self,
        name: &str,
        args: &Arguments,
        options: CallOptions,
        window_hours: Option<u32>,
        output: Option<&Path>,
        format: OutputFormat,
    ) -> Result<()> {
        if output.is_some() && !options.as_table {
            return Err(Error::config(
                "--output writes a table and cannot be combined with --raw",
            ));
        }

        let client = self.client(true).await?;
        let result = match window_hours {
            Some(hours) => {
                let (args, range) = split_range(name, args, hours)?;
                client.fetch_range(name, &args, &range, options).await
            }
            None => client.call(name, args, options).await,
        };
        // Keep whatever was cached even when the call failed
        client.close().await?;
        let result = result?;

        match (result, output) {
            (CallOutput::Table(table), Some(path)) => {
                let rows = write_table(path, &table, None)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("Wrote {rows} rows to {}", path.display());
            }
            (CallOutput::Table(table), None) => print_table(&table, format)?,
            (CallOutput::Rows(rows), _) => print_rows(&rows)?,
        }
        Ok(())
    }

    async fn cache(&self, action: CacheAction) -> Result<()> {
        if self.cli.cache_backend == CacheBackend::Memory {
            println!("The memory cache lives only for one process; nothing is stored");
            return Ok(());
        }

        let cache = ResponseCache::open(CacheBackend::File, &self.cache_name(), None)?;
        match action {
            CacheAction::Clear => {
                let entries = cache.len().await;
                cache.clear().await?;
                println!("Removed {entries} cached responses from {}", cache.path().display());
            }
            CacheAction::Info => {
                println!("path: {}", cache.path().display());
                println!("entries: {}", cache.len().await);
            }
        }
        Ok(())
    }
}

/// Pull `start`/`end` out of the arguments and turn them into a range request
fn split_range(name: &str, args: &Arguments, hours: u32) -> Result<(Arguments, RangeRequest)> {
    if hours == 0 {
        return Err(Error::argument(name, "--window-hours must be at least 1"));
    }

    let mut args = args.clone();
    let start = take_datetime(name, &mut args, "start")?;
    let end = take_datetime(name, &mut args, "end")?;
    let step = chrono::Duration::hours(i64::from(hours));
    debug!(operation = name, %start, %end, hours, "Splitting call into windows");

    Ok((args, RangeRequest::new(start, end, step)))
}

fn take_datetime(
    name: &str,
    args: &mut Arguments,
    param: &str,
) -> Result<chrono::NaiveDateTime> {
    match args.remove(param) {
        Some(ArgValue::Text(text)) => parse_timestamp(&text).ok_or_else(|| {
            Error::argument(name, format!("'{param}' is not a date or datetime: {text}"))
        }),
        Some(other) => Err(Error::argument(
            name,
            format!("'{param}' must be given as text, got {other:?}"),
        )),
        None => Err(Error::missing_argument(name, param)),
    }
}

fn print_table(table: &Table, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Pretty => println!("{}", table.pretty()?),
        OutputFormat::Json => print_json_lines(&table.to_json_rows()?)?,
    }
    Ok(())
}

fn print_rows(rows: &[JsonObject]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}

fn print_json_lines(rows: &[JsonObject]) -> Result<()> {
    for row in rows {
        println!("{}", serde_json::to_string(row)?);
    }
    Ok(())
}

