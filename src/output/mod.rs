//! Output module
//!
//! Handles Parquet export of result tables and conversion back to JSON rows.

mod json;
mod writer;

pub use json::arrow_to_json;
pub use writer::{write_batch, write_table, ParquetWriter, ParquetWriterConfig};
