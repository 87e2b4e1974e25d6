//! Long-to-wide reshaping

use super::convert::Column;
use super::types::TableLayout;
use crate::error::{Error, Result};
use crate::schema::PivotSpec;
use crate::types::ColumnKind;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

/// Pivot named columns into a wide table.
///
/// Output rows are the distinct index values in ascending order. Output
/// columns are the distinct key values in ascending order, one block per
/// value column. Cells that no input row fills are null; a second row for
/// the same (index, key) pair is an error, and so is a wide column name that
/// occurs twice.
pub(crate) fn pivot_columns(
    columns: &[(String, Column)],
    spec: &PivotSpec,
) -> Result<(Vec<(String, Column)>, TableLayout)> {
    let index = find(columns, &spec.index, "index")?;
    let key = find(columns, &spec.columns, "key")?;
    if spec.index == spec.columns {
        return Err(Error::pivot(format!(
            "index and key are the same column '{}'",
            spec.index
        )));
    }

    let value_names = value_columns(columns, spec)?;
    let num_rows = index.len();

    for row in 0..num_rows {
        if index.is_null(row) {
            return Err(Error::pivot(format!(
                "null in index column '{}' at row {row}",
                spec.index
            )));
        }
        if key.is_null(row) {
            return Err(Error::pivot(format!(
                "null in key column '{}' at row {row}",
                spec.columns
            )));
        }
    }

    // Distinct index and key values, each mapped to its output position
    let index_groups = group(index, num_rows);
    let key_groups = group(key, num_rows);

    let width = key_groups.groups.len();
    let height = index_groups.groups.len();

    // Source row for each (index, key) cell
    let mut cells: Vec<Option<usize>> = vec![None; height * width];
    for row in 0..num_rows {
        let slot = index_groups.of_row[row] * width + key_groups.of_row[row];
        if cells[slot].is_some() {
            return Err(Error::ambiguous_pivot(
                index.render(row).unwrap_or_default(),
                key.render(row).unwrap_or_default(),
            ));
        }
        cells[slot] = Some(row);
    }

    let key_names: Vec<String> = key_groups
        .groups
        .iter()
        .map(|&row| key.render(row).unwrap_or_default())
        .collect();

    let index_positions: Vec<Option<usize>> =
        index_groups.groups.iter().map(|&row| Some(row)).collect();
    let mut output = vec![(spec.index.clone(), index.gather(&index_positions))];

    let many = value_names.len() > 1;
    for value_name in &value_names {
        let source = find(columns, value_name, "value")?;
        for (k, key_name) in key_names.iter().enumerate() {
            let positions: Vec<Option<usize>> =
                (0..height).map(|i| cells[i * width + k]).collect();
            let name = if many {
                format!("{value_name}.{key_name}")
            } else {
                key_name.clone()
            };
            output.push((name, source.gather(&positions)));
        }
    }

    let mut seen = HashSet::new();
    if let Some((name, _)) = output.iter().find(|(name, _)| !seen.insert(name.as_str())) {
        return Err(Error::pivot(format!(
            "pivoting '{}' by '{}' produces the column name '{name}' twice",
            spec.index, spec.columns
        )));
    }

    debug!(
        index = %spec.index,
        key = %spec.columns,
        rows = height,
        columns = output.len(),
        "Pivoted table"
    );

    let layout = TableLayout::Pivoted {
        index: spec.index.clone(),
        columns: spec.columns.clone(),
        values: value_names,
    };
    Ok((output, layout))
}

fn find<'a>(columns: &'a [(String, Column)], name: &str, role: &str) -> Result<&'a Column> {
    columns
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, c)| c)
        .ok_or_else(|| Error::pivot(format!("{role} column '{name}' is not in the result")))
}

/// Columns whose cells fill the wide table
fn value_columns(columns: &[(String, Column)], spec: &PivotSpec) -> Result<Vec<String>> {
    if let Some(values) = &spec.values {
        find(columns, values, "value")?;
        return Ok(vec![values.clone()]);
    }

    let mut values = Vec::new();
    for (name, column) in columns {
        if *name == spec.index || *name == spec.columns {
            continue;
        }
        if column.kind() == ColumnKind::Number {
            values.push(name.clone());
        } else {
            debug!(
                column = %name,
                kind = %column.kind(),
                "Dropping non-numeric column from pivot"
            );
        }
    }

    if values.is_empty() {
        return Err(Error::pivot(format!(
            "no numeric columns to pivot on '{}' by '{}'",
            spec.index, spec.columns
        )));
    }
    Ok(values)
}

/// Distinct values of a column in ascending order
struct Groups {
    /// Representative source row of each distinct value
    groups: Vec<usize>,
    /// Group position of each source row
    of_row: Vec<usize>,
}

fn group(column: &Column, num_rows: usize) -> Groups {
    let mut order: Vec<usize> = (0..num_rows).collect();
    order.sort_by(|&a, &b| column.compare(a, b));

    let mut groups: Vec<usize> = Vec::new();
    let mut of_row = vec![0; num_rows];
    for row in order {
        let same = groups
            .last()
            .is_some_and(|&last| column.compare(last, row) == Ordering::Equal);
        if !same {
            groups.push(row);
        }
        of_row[row] = groups.len() - 1;
    }

    Groups { groups, of_row }
}
