//! Column type inference from JSON rows

use crate::schema::ResponseShape;
use crate::timestamp::is_timestamp;
use crate::types::{ColumnKind, JsonObject};
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

/// A column's name and the kind chosen for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
    pub name: String,
    pub kind: ColumnKind,
}

/// Decide column order and kinds for a set of rows.
///
/// Declared columns come first (in declared order, if present in the rows),
/// then undeclared ones in first-seen order. A declared kind is kept when
/// every value conforms to it.
pub fn plan_columns(rows: &[JsonObject], shape: &ResponseShape) -> Vec<ColumnPlan> {
    column_order(rows, shape)
        .into_iter()
        .map(|name| {
            let values: Vec<&Value> = rows.iter().filter_map(|row| row.get(&name)).collect();
            let declared = shape
                .columns
                .iter()
                .find(|c| c.name == name)
                .map(|c| c.kind);
            let kind = choose_kind(&name, declared, &values);
            ColumnPlan { name, kind }
        })
        .collect()
}

fn column_order(rows: &[JsonObject], shape: &ResponseShape) -> Vec<String> {
    let present: HashSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut seen = HashSet::new();
    let mut order = Vec::new();

    for column in &shape.columns {
        if present.contains(column.name.as_str()) && seen.insert(column.name.as_str()) {
            order.push(column.name.clone());
        }
    }
    for row in rows {
        for key in row.keys() {
            if seen.insert(key.as_str()) {
                order.push(key.clone());
            }
        }
    }
    order
}

fn choose_kind(name: &str, declared: Option<ColumnKind>, values: &[&Value]) -> ColumnKind {
    if values.iter().all(|v| v.is_null()) {
        return ColumnKind::Text;
    }

    let inferred = infer_kind(values);
    match declared {
        Some(kind) if all_conform(values, kind) => kind,
        Some(kind) => {
            warn!(
                column = name,
                declared = %kind,
                inferred = %inferred,
                "Values do not match declared column type, using inferred type"
            );
            inferred
        }
        None => inferred,
    }
}

/// Most specific kind every non-null value conforms to
pub fn infer_kind(values: &[&Value]) -> ColumnKind {
    if all_conform(values, ColumnKind::Number) {
        ColumnKind::Number
    } else if all_conform(values, ColumnKind::DateTime) {
        ColumnKind::DateTime
    } else {
        ColumnKind::Text
    }
}

fn all_conform(values: &[&Value], kind: ColumnKind) -> bool {
    values.iter().all(|v| v.is_null() || conforms(v, kind))
}

/// Whether a single non-null value can be stored as `kind`
pub fn conforms(value: &Value, kind: ColumnKind) -> bool {
    match kind {
        ColumnKind::Number => match value {
            Value::Number(_) => true,
            Value::String(s) => parse_number(s).is_some(),
            _ => false,
        },
        ColumnKind::DateTime => value.as_str().is_some_and(is_timestamp),
        ColumnKind::Text => true,
    }
}

/// Parse a numeric string (finite values only)
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
