//! Table types

use crate::error::Result;
use crate::types::{ColumnKind, JsonObject};
use arrow::array::ArrayRef;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use std::fmt;

/// How a table's rows relate to the response rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableLayout {
    /// One row per response row
    Rows,
    /// One row per distinct `index` value, one column per distinct `columns`
    /// value (per value column)
    Pivoted {
        index: String,
        columns: String,
        values: Vec<String>,
    },
}

/// A formatted call result
#[derive(Debug, Clone)]
pub struct Table {
    batch: RecordBatch,
    kinds: Vec<ColumnKind>,
    layout: TableLayout,
}

impl Table {
    pub(crate) fn new(batch: RecordBatch, kinds: Vec<ColumnKind>, layout: TableLayout) -> Self {
        debug_assert_eq!(batch.num_columns(), kinds.len());
        Self {
            batch,
            kinds,
            layout,
        }
    }

    /// The underlying Arrow batch
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    pub fn is_pivoted(&self) -> bool {
        matches!(self.layout, TableLayout::Pivoted { .. })
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    /// Column names in table order
    pub fn column_names(&self) -> Vec<&str> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect()
    }

    /// Inferred kind of each column, in table order
    pub fn kinds(&self) -> &[ColumnKind] {
        &self.kinds
    }

    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        let idx = self.batch.schema_ref().index_of(name).ok()?;
        self.kinds.get(idx).copied()
    }

    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    /// Convert back to JSON rows (nulls included, timestamps as ISO strings)
    pub fn to_json_rows(&self) -> Result<Vec<JsonObject>> {
        crate::output::arrow_to_json(&self.batch)
    }

    /// Render as an ASCII table
    pub fn pretty(&self) -> Result<String> {
        Ok(pretty_format_batches(std::slice::from_ref(&self.batch))?.to_string())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match pretty_format_batches(std::slice::from_ref(&self.batch)) {
            Ok(rendered) => write!(f, "{rendered}"),
            Err(_) => write!(
                f,
                "<table: {} rows x {} columns>",
                self.num_rows(),
                self.num_columns()
            ),
        }
    }
}
