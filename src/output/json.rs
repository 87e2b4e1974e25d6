//! Arrow to JSON conversion
//!
//! Renders table rows back into JSON objects, e.g. for `--format json`.

use crate::error::{Error, Result};
use crate::timestamp::format_timestamp;
use crate::types::{JsonObject, JsonValue};
use arrow::array::{Array, Float64Array, StringArray, TimestampMillisecondArray};
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use chrono::DateTime;

/// Convert an Arrow RecordBatch to JSON records
///
/// Returns one JSON object per row; null cells are explicit `null`s.
pub fn arrow_to_json(batch: &RecordBatch) -> Result<Vec<JsonObject>> {
    let schema = batch.schema();
    let mut records = Vec::with_capacity(batch.num_rows());

    for row in 0..batch.num_rows() {
        let mut record = JsonObject::new();
        for (col, field) in schema.fields().iter().enumerate() {
            let value = cell_to_json(batch.column(col).as_ref(), row)?;
            record.insert(field.name().clone(), value);
        }
        records.push(record);
    }

    Ok(records)
}

/// Convert a single array element to JSON
fn cell_to_json(array: &dyn Array, row: usize) -> Result<JsonValue> {
    if array.is_null(row) {
        return Ok(JsonValue::Null);
    }

    match array.data_type() {
        DataType::Null => Ok(JsonValue::Null),

        DataType::Float64 => {
            let arr = downcast::<Float64Array>(array)?;
            Ok(serde_json::Number::from_f64(arr.value(row))
                .map_or(JsonValue::Null, JsonValue::Number))
        }

        DataType::Utf8 => {
            let arr = downcast::<StringArray>(array)?;
            Ok(JsonValue::String(arr.value(row).to_string()))
        }

        DataType::Timestamp(TimeUnit::Millisecond, None) => {
            let arr = downcast::<TimestampMillisecondArray>(array)?;
            let millis = arr.value(row);
            let dt = DateTime::from_timestamp_millis(millis)
                .ok_or_else(|| Error::output(format!("Timestamp out of range: {millis}")))?;
            Ok(JsonValue::String(format_timestamp(&dt.naive_utc())))
        }

        // Anything else goes through Arrow's display formatting
        _ => Ok(JsonValue::String(array_value_to_string(array, row)?)),
    }
}

fn downcast<T: 'static>(array: &dyn Array) -> Result<&T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        Error::output(format!(
            "Failed to downcast {} array",
            array.data_type()
        ))
    })
}
