//! Table formatter
//!
//! Turns the JSON rows of a call into a typed Arrow table, optionally
//! pivoted from long to wide form.
//!
//! # Column Types
//!
//! | Kind     | Values                                  | Arrow type                      |
//! |----------|-----------------------------------------|---------------------------------|
//! | Number   | JSON numbers or numeric strings         | `Float64`                       |
//! | DateTime | strings in a recognized timestamp form  | `Timestamp(Millisecond, None)`  |
//! | Text     | anything else                           | `Utf8`                          |

mod convert;
mod inference;
mod pivot;
mod types;

pub use convert::data_type;
pub use inference::{infer_kind, plan_columns, ColumnPlan};
pub use types::{Table, TableLayout};

use crate::error::Result;
use crate::schema::{OperationDescriptor, PivotSpec, ResponseShape};
use crate::types::JsonObject;

/// Format rows returned by an operation.
///
/// With `pivot` set and a pivot known for the operation the result is wide;
/// otherwise it has one row per input row.
pub fn format_rows(
    rows: &[JsonObject],
    descriptor: &OperationDescriptor,
    pivot: bool,
) -> Result<Table> {
    match (&descriptor.pivot, pivot) {
        (Some(spec), true) if !rows.is_empty() => pivot_rows(rows, &descriptor.response, spec),
        _ => rows_to_table(rows, &descriptor.response),
    }
}

/// Build a row-oriented table
pub fn rows_to_table(rows: &[JsonObject], shape: &ResponseShape) -> Result<Table> {
    let plan = plan_columns(rows, shape);
    let columns = convert::build_columns(rows, &plan);
    let kinds = columns.iter().map(|(_, c)| c.kind()).collect();
    let batch = convert::to_record_batch(&columns)?;
    Ok(Table::new(batch, kinds, TableLayout::Rows))
}

/// Build a wide table
pub fn pivot_rows(rows: &[JsonObject], shape: &ResponseShape, spec: &PivotSpec) -> Result<Table> {
    let plan = plan_columns(rows, shape);
    let columns = convert::build_columns(rows, &plan);
    let (wide, layout) = pivot::pivot_columns(&columns, spec)?;
    let kinds = wide.iter().map(|(_, c)| c.kind()).collect();
    let batch = convert::to_record_batch(&wide)?;
    Ok(Table::new(batch, kinds, layout))
}
