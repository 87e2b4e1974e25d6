//! Typed columns and Arrow conversion

use super::inference::{parse_number, ColumnPlan};
use crate::error::{Error, Result};
use crate::timestamp::{format_timestamp, parse_cell_timestamp};
use crate::types::{ColumnKind, JsonObject};
use arrow::array::{ArrayRef, Float64Array, StringArray, TimestampMillisecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

/// Column values before they become an Arrow array
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Column {
    Number(Vec<Option<f64>>),
    DateTime(Vec<Option<NaiveDateTime>>),
    Text(Vec<Option<String>>),
}

impl Column {
    /// Convert JSON values; values that do not fit `kind` become null
    pub fn from_values(kind: ColumnKind, values: &[Option<&Value>]) -> Self {
        let present = values.iter().map(|v| v.filter(|v| !v.is_null()));
        match kind {
            ColumnKind::Number => Column::Number(
                present
                    .map(|v| {
                        v.and_then(|v| match v {
                            Value::Number(n) => n.as_f64(),
                            Value::String(s) => parse_number(s),
                            _ => None,
                        })
                    })
                    .collect(),
            ),
            ColumnKind::DateTime => Column::DateTime(
                present
                    .map(|v| v.and_then(Value::as_str).and_then(parse_cell_timestamp))
                    .collect(),
            ),
            ColumnKind::Text => Column::Text(
                present
                    .map(|v| {
                        v.map(|v| match v {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                    })
                    .collect(),
            ),
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Number(_) => ColumnKind::Number,
            Column::DateTime(_) => ColumnKind::DateTime,
            Column::Text(_) => ColumnKind::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Number(v) => v.len(),
            Column::DateTime(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_null(&self, row: usize) -> bool {
        match self {
            Column::Number(v) => v.get(row).map_or(true, Option::is_none),
            Column::DateTime(v) => v.get(row).map_or(true, Option::is_none),
            Column::Text(v) => v.get(row).map_or(true, Option::is_none),
        }
    }

    /// Text form of one cell, used for pivot column names
    pub fn render(&self, row: usize) -> Option<String> {
        match self {
            Column::Number(v) => v.get(row).copied().flatten().map(render_number),
            Column::DateTime(v) => v.get(row).copied().flatten().map(|dt| format_timestamp(&dt)),
            Column::Text(v) => v.get(row).cloned().flatten(),
        }
    }

    /// Compare two non-null cells
    pub fn compare(&self, a: usize, b: usize) -> Ordering {
        match self {
            Column::Number(v) => v[a].unwrap_or(f64::NAN).total_cmp(&v[b].unwrap_or(f64::NAN)),
            Column::DateTime(v) => v[a].cmp(&v[b]),
            Column::Text(v) => v[a].cmp(&v[b]),
        }
    }

    /// New column whose cell `i` is this column's cell `positions[i]`
    /// (null where the position is `None`)
    pub fn gather(&self, positions: &[Option<usize>]) -> Column {
        fn pick<T: Clone>(src: &[Option<T>], positions: &[Option<usize>]) -> Vec<Option<T>> {
            positions
                .iter()
                .map(|p| p.and_then(|i| src.get(i).cloned().flatten()))
                .collect()
        }
        match self {
            Column::Number(v) => Column::Number(pick(v, positions)),
            Column::DateTime(v) => Column::DateTime(pick(v, positions)),
            Column::Text(v) => Column::Text(pick(v, positions)),
        }
    }

    pub fn data_type(&self) -> DataType {
        data_type(self.kind())
    }

    pub fn to_array(&self) -> ArrayRef {
        match self {
            Column::Number(v) => Arc::new(Float64Array::from(v.clone())),
            Column::DateTime(v) => Arc::new(TimestampMillisecondArray::from(
                v.iter()
                    .map(|dt| dt.map(|dt| dt.and_utc().timestamp_millis()))
                    .collect::<Vec<_>>(),
            )),
            Column::Text(v) => Arc::new(StringArray::from(v.clone())),
        }
    }
}

/// Arrow type used to store a column kind
pub fn data_type(kind: ColumnKind) -> DataType {
    match kind {
        ColumnKind::Number => DataType::Float64,
        ColumnKind::DateTime => DataType::Timestamp(TimeUnit::Millisecond, None),
        ColumnKind::Text => DataType::Utf8,
    }
}

fn render_number(n: f64) -> String {
    // 5.0 renders as "5"
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

/// Build typed columns from rows according to a column plan
pub(crate) fn build_columns(rows: &[JsonObject], plan: &[ColumnPlan]) -> Vec<(String, Column)> {
    plan.iter()
        .map(|col| {
            let values: Vec<Option<&Value>> = rows.iter().map(|row| row.get(&col.name)).collect();
            (col.name.clone(), Column::from_values(col.kind, &values))
        })
        .collect()
}

/// Assemble named columns into a RecordBatch
pub(crate) fn to_record_batch(columns: &[(String, Column)]) -> Result<RecordBatch> {
    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, col)| Field::new(name, col.data_type(), true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    if columns.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }

    let arrays: Vec<ArrayRef> = columns.iter().map(|(_, col)| col.to_array()).collect();
    RecordBatch::try_new(schema, arrays)
        .map_err(|e| Error::output(format!("Failed to create RecordBatch: {e}")))
}
