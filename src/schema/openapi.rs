//! OpenAPI document parsing
//!
//! Turns an OpenAPI 3 document into operation descriptors. Only the parts the
//! client needs are read: paths, parameters, the 200 response row schema and
//! the `x-pivot` / `x-method-name` extensions.

use super::types::{
    ApiSchema, OperationDescriptor, ParameterDescriptor, PivotSource, PivotSpec, ResponseColumn,
    ResponseShape, RESERVED_PARAMS,
};
use crate::error::{Error, Result};
use crate::template::{extract_placeholders, path_to_name};
use crate::types::{ColumnKind, Method, OptionStringExt, ParamKind, ParamLocation};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

const HTTP_METHODS: &[&str] = &["get", "post", "put", "patch", "delete"];

/// Parse an OpenAPI document into an [`ApiSchema`]
pub fn parse_document(doc: &Value) -> Result<ApiSchema> {
    let paths = doc
        .get("paths")
        .ok_or_else(|| Error::config("Interface description has no 'paths'"))?
        .as_object()
        .ok_or_else(|| Error::config("'paths' must be an object"))?;

    let title = doc
        .pointer("/info/title")
        .and_then(Value::as_str)
        .unwrap_or("ISOStream API");
    let version = doc
        .pointer("/info/version")
        .and_then(Value::as_str)
        .unwrap_or("0");

    let mut operations: BTreeMap<String, Arc<OperationDescriptor>> = BTreeMap::new();

    for (path, item) in paths {
        let shared_params = item
            .get("parameters")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for method_key in HTTP_METHODS {
            let Some(op) = item.get(*method_key) else {
                continue;
            };
            let method: Method = method_key.parse().map_err(Error::config)?;
            let descriptor = parse_operation(doc, path, method, op, shared_params)?;

            if let Some(existing) = operations.get(&descriptor.name) {
                return Err(Error::config(format!(
                    "Duplicate method name '{}' for {} {} and {} {}",
                    descriptor.name, existing.method, existing.path, method, path
                )));
            }
            debug!(name = %descriptor.name, %method, %path, "Registered operation");
            operations.insert(descriptor.name.clone(), Arc::new(descriptor));
        }
    }

    if operations.is_empty() {
        return Err(Error::config(
            "Interface description must declare at least one operation",
        ));
    }

    Ok(ApiSchema::new(title, version, operations))
}

/// Method name for an operation: `x-method-name`, else the path
/// (prefixed with the HTTP method for anything but GET)
fn method_name(path: &str, method: Method, op: &Value) -> String {
    if let Some(name) = op.get("x-method-name").and_then(Value::as_str) {
        return name.to_string();
    }
    let base = path_to_name(path);
    if method == Method::GET {
        base
    } else {
        format!("{}_{base}", method.as_str().to_ascii_lowercase())
    }
}

fn parse_operation(
    doc: &Value,
    path: &str,
    method: Method,
    op: &Value,
    shared_params: &[Value],
) -> Result<OperationDescriptor> {
    let name = method_name(path, method, op);
    if name.is_empty() {
        return Err(Error::config(format!("Cannot derive a method name for '{path}'")));
    }

    let mut parameters: Vec<ParameterDescriptor> = Vec::new();
    let own_params = op
        .get("parameters")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for raw in shared_params.iter().chain(own_params) {
        let param = parse_parameter(doc, raw).map_err(|e| match e {
            Error::Config { message } => Error::config(format!("{name}: {message}")),
            other => other,
        })?;
        if RESERVED_PARAMS.contains(&param.name.as_str()) {
            continue;
        }
        // Operation-level parameters override path-level ones
        if let Some(existing) = parameters.iter_mut().find(|p| p.name == param.name) {
            *existing = param;
        } else {
            parameters.push(param);
        }
    }

    for placeholder in extract_placeholders(path) {
        let declared = parameters
            .iter()
            .any(|p| p.name == placeholder && p.location == ParamLocation::Path);
        if !declared {
            return Err(Error::config(format!(
                "{name}: path placeholder '{{{placeholder}}}' has no path parameter"
            )));
        }
    }

    let response = parse_response(doc, op)?;
    let pivot = parse_pivot(&name, op, &response)?;

    Ok(OperationDescriptor {
        name,
        method,
        path: path.to_string(),
        summary: string_field(op, "summary"),
        description: string_field(op, "description"),
        parameters,
        response,
        pivot,
    })
}

fn parse_parameter(doc: &Value, raw: &Value) -> Result<ParameterDescriptor> {
    let raw = resolve(doc, raw)?;
    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::config("parameter without a name"))?;
    let location: ParamLocation = raw
        .get("in")
        .and_then(Value::as_str)
        .unwrap_or("query")
        .parse()
        .map_err(Error::config)?;
    let required = location == ParamLocation::Path
        || raw.get("required").and_then(Value::as_bool).unwrap_or(false);

    let schema = raw.get("schema").cloned().unwrap_or(Value::Null);
    let type_name = ref_name(&schema);
    let resolved = resolve(doc, &schema)?;

    let description = string_field(raw, "description")
        .or_else(|| string_field(resolved, "description"));

    Ok(ParameterDescriptor {
        name: name.to_string(),
        location,
        required,
        kind: param_kind(resolved),
        type_name,
        description,
        enum_values: enum_values(resolved),
    })
}

fn parse_response(doc: &Value, op: &Value) -> Result<ResponseShape> {
    let responses = op.get("responses");
    let schema = responses
        .and_then(|r| r.get("200").or_else(|| r.get("201")))
        .and_then(|r| r.pointer("/content/application~1json/schema"));
    let Some(schema) = schema else {
        return Ok(ResponseShape::default());
    };

    let schema = resolve(doc, schema)?;
    // Row schema: `items` of an array response, or the object itself
    let (row_ref, row) = match schema.get("items") {
        Some(items) => (ref_name(items), resolve(doc, items)?),
        None => (ref_name(schema), schema),
    };

    let mut columns = Vec::new();
    if let Some(props) = row.get("properties").and_then(Value::as_object) {
        for (name, prop) in props {
            let prop = resolve(doc, prop)?;
            columns.push(ResponseColumn {
                name: name.clone(),
                kind: column_kind(prop),
                description: string_field(prop, "description"),
            });
        }
    }

    Ok(ResponseShape {
        type_name: row_ref.or_else(|| string_field(row, "title")),
        columns,
    })
}

fn parse_pivot(name: &str, op: &Value, response: &ResponseShape) -> Result<Option<PivotSpec>> {
    let Some(ext) = op.get("x-pivot") else {
        return Ok(PivotSpec::guess(response));
    };
    if ext.is_null() || ext == &Value::Bool(false) {
        return Ok(None);
    }

    let field = |key: &str| ext.get(key).and_then(Value::as_str).map(str::to_string);
    let (Some(index), Some(columns)) = (field("index"), field("columns")) else {
        return Err(Error::config(format!(
            "{name}: x-pivot needs both 'index' and 'columns'"
        )));
    };
    let spec = PivotSpec {
        index,
        columns,
        values: field("values"),
        source: PivotSource::Declared,
    };

    if !response.is_empty() {
        let declared = [Some(&spec.index), Some(&spec.columns), spec.values.as_ref()];
        for column in declared.into_iter().flatten() {
            if !response.columns.iter().any(|c| &c.name == column) {
                return Err(Error::config(format!(
                    "{name}: x-pivot refers to unknown column '{column}'"
                )));
            }
        }
    }

    Ok(Some(spec))
}

/// Follow a `$ref` (directly or through a single-entry `allOf`) to its target
fn resolve<'a>(doc: &'a Value, value: &'a Value) -> Result<&'a Value> {
    let reference = value.get("$ref").and_then(Value::as_str).or_else(|| {
        value
            .get("allOf")
            .and_then(Value::as_array)
            .filter(|all| all.len() == 1)
            .and_then(|all| all[0].get("$ref"))
            .and_then(Value::as_str)
    });

    match reference {
        None => Ok(value),
        Some(r) => {
            let pointer = r
                .strip_prefix('#')
                .ok_or_else(|| Error::config(format!("Only local references are supported: {r}")))?;
            doc.pointer(pointer)
                .ok_or_else(|| Error::config(format!("Unresolved reference: {r}")))
        }
    }
}

/// Last segment of a `$ref`, e.g. `ISO` for `#/components/schemas/ISO`
fn ref_name(value: &Value) -> Option<String> {
    let reference = value.get("$ref").and_then(Value::as_str).or_else(|| {
        value
            .get("allOf")
            .and_then(Value::as_array)
            .and_then(|all| all.first())
            .and_then(|first| first.get("$ref"))
            .and_then(Value::as_str)
    })?;
    reference.rsplit('/').next().map(str::to_string)
}

fn param_kind(schema: &Value) -> ParamKind {
    let format = schema.get("format").and_then(Value::as_str);
    match schema.get("type").and_then(Value::as_str) {
        Some("string") if matches!(format, Some("date-time" | "date")) => ParamKind::DateTime,
        Some("integer") => ParamKind::Integer,
        Some("number") => ParamKind::Number,
        Some("boolean") => ParamKind::Boolean,
        Some("array") => ParamKind::Array,
        _ => ParamKind::String,
    }
}

fn column_kind(schema: &Value) -> ColumnKind {
    let format = schema.get("format").and_then(Value::as_str);
    match schema.get("type").and_then(Value::as_str) {
        Some("number" | "integer") => ColumnKind::Number,
        Some("string") if matches!(format, Some("date-time" | "date")) => ColumnKind::DateTime,
        _ => ColumnKind::Text,
    }
}

fn enum_values(schema: &Value) -> Vec<String> {
    schema
        .get("enum")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .none_if_empty()
}
