//! Tests for the schema loader

use super::*;
use crate::types::{ColumnKind, Method, ParamKind, ParamLocation};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

fn minimal_doc() -> serde_json::Value {
    json!({
        "openapi": "3.0.2",
        "info": {"title": "Test", "version": "9.9"},
        "paths": {
            "/dalmp/node": {
                "get": {
                    "parameters": [
                        {"name": "api_key", "in": "query", "required": true, "schema": {"type": "string"}},
                        {"name": "iso", "in": "query", "required": true, "schema": {"$ref": "#/components/schemas/ISO"}},
                        {"name": "start", "in": "query", "required": true, "schema": {"type": "string", "format": "date-time"}},
                        {"name": "limit", "in": "query", "schema": {"type": "integer"}}
                    ],
                    "responses": {
                        "200": {"content": {"application/json": {"schema": {
                            "type": "array",
                            "items": {"$ref": "#/components/schemas/Row"}
                        }}}}
                    }
                }
            }
        },
        "components": {"schemas": {
            "ISO": {"type": "string", "description": "Market", "enum": ["ercot", "pjm"]},
            "Row": {"type": "object", "properties": {
                "timestamp": {"type": "string", "format": "date-time"},
                "node": {"type": "string"},
                "lmp": {"type": "number"}
            }}
        }}
    })
}

// ============================================================================
// Bundled Document Tests
// ============================================================================

#[test]
fn test_bundled_schema_loads() {
    let schema = bundled_schema().unwrap();
    assert_eq!(schema.title(), "ISOStream");
    assert_eq!(schema.version(), "1.0.1");
    assert!(schema.len() >= 8);
    assert!(schema.operation("dalmp_node").is_some());
    assert!(schema.operation("nodes").is_some());
}

#[test]
fn test_bundled_names_unique_and_sorted() {
    let schema = bundled_schema().unwrap();
    let names = schema.names();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(names, sorted);
}

#[test]
fn test_bundled_dalmp_node_descriptor() {
    let schema = bundled_schema().unwrap();
    let op = schema.operation("dalmp_node").unwrap();

    assert_eq!(op.method, Method::GET);
    assert_eq!(op.path, "/dalmp/node");
    assert!(op.parameter("api_key").is_none());

    let names: Vec<_> = op.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["iso", "nodes", "start", "end"]);

    let iso = op.parameter("iso").unwrap();
    assert_eq!(iso.type_name.as_deref(), Some("ISO"));
    assert!(iso.enum_values.contains(&"ercot".to_string()));
    assert_eq!(op.parameter("start").unwrap().kind, ParamKind::DateTime);

    let pivot = op.pivot.as_ref().unwrap();
    assert_eq!(pivot.index, "timestamp");
    assert_eq!(pivot.columns, "node");
    assert_eq!(pivot.values.as_deref(), Some("lmp"));
    assert_eq!(pivot.source, PivotSource::Declared);
}

#[test]
fn test_bundled_guessed_and_disabled_pivots() {
    let schema = bundled_schema().unwrap();

    let fuel = schema.operation("fuelmix").unwrap();
    let pivot = fuel.pivot.as_ref().unwrap();
    assert_eq!(pivot.source, PivotSource::Guessed);
    assert_eq!(pivot.index, "timestamp");
    assert_eq!(pivot.columns, "fuel");
    assert!(pivot.values.is_none());

    let nodes = schema.operation("nodes").unwrap();
    assert!(nodes.pivot.is_none());
    assert_eq!(
        nodes.parameter("iso").unwrap().location,
        ParamLocation::Path
    );
}

// ============================================================================
// Parsing Tests
// ============================================================================

#[test]
fn test_parse_minimal_document() {
    let schema = load_schema_from_value(&minimal_doc()).unwrap();
    assert_eq!(schema.names(), vec!["dalmp_node"]);

    let op = schema.operation("dalmp_node").unwrap();
    assert_eq!(op.parameters.len(), 3);
    assert!(!op.parameter("limit").unwrap().required);
    assert_eq!(op.parameter("limit").unwrap().kind, ParamKind::Integer);
    assert_eq!(
        op.parameter("iso").unwrap().description.as_deref(),
        Some("Market")
    );

    assert_eq!(op.response.type_name.as_deref(), Some("Row"));
    assert_eq!(op.column_kind("timestamp"), Some(ColumnKind::DateTime));
    assert_eq!(op.column_kind("node"), Some(ColumnKind::Text));
    assert_eq!(op.column_kind("lmp"), Some(ColumnKind::Number));

    // Declared order is kept
    let columns: Vec<_> = op.response.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(columns, vec!["timestamp", "node", "lmp"]);
}

#[test]
fn test_parse_yaml_document() {
    let yaml = r#"
openapi: 3.0.2
info:
  title: Yaml
  version: "1"
paths:
  /load/actual:
    get:
      parameters:
        - name: iso
          in: query
          required: true
          schema:
            type: string
      responses:
        "200":
          content:
            application/json:
              schema:
                type: array
                items:
                  type: object
                  properties:
                    region:
                      type: string
                    load_mw:
                      type: number
"#;
    let schema = load_schema_from_str(yaml).unwrap();
    let op = schema.operation("load_actual").unwrap();
    assert_eq!(op.parameters.len(), 1);
    // No datetime column, so no pivot can be guessed
    assert!(op.pivot.is_none());
}

#[test]
fn test_path_level_parameters_and_non_get_names() {
    let doc = json!({
        "paths": {
            "/reports/{iso}": {
                "parameters": [{"name": "iso", "in": "path", "schema": {"type": "string"}}],
                "get": {"responses": {}},
                "post": {"parameters": [{"name": "title", "in": "query", "required": true, "schema": {"type": "string"}}]}
            }
        }
    });
    let schema = load_schema_from_value(&doc).unwrap();
    assert_eq!(schema.names(), vec!["post_reports_iso", "reports_iso"]);

    let post = schema.operation("post_reports_iso").unwrap();
    assert_eq!(post.method, Method::POST);
    let iso = post.parameter("iso").unwrap();
    assert!(iso.required);
    assert_eq!(iso.location, ParamLocation::Path);
    assert!(post.parameter("title").is_some());
}

#[test]
fn test_undeclared_path_placeholder_rejected() {
    let doc = json!({
        "paths": {
            "/nodes/{iso}": {"get": {"responses": {}}}
        }
    });
    let err = load_schema_from_value(&doc).unwrap_err();
    assert!(matches!(err, crate::Error::Config { .. }));
    assert!(err.to_string().contains("'{iso}'"));
}

#[test]
fn test_all_of_reference() {
    let mut doc = minimal_doc();
    doc["paths"]["/dalmp/node"]["get"]["parameters"][1]["schema"] =
        json!({"allOf": [{"$ref": "#/components/schemas/ISO"}]});
    let schema = load_schema_from_value(&doc).unwrap();
    let iso = schema.operation("dalmp_node").unwrap().parameter("iso").unwrap();
    assert_eq!(iso.type_name.as_deref(), Some("ISO"));
    assert_eq!(iso.enum_values, vec!["ercot".to_string(), "pjm".to_string()]);
}

#[test]
fn test_explicit_pivot_extension() {
    let mut doc = minimal_doc();
    doc["paths"]["/dalmp/node"]["get"]["x-pivot"] =
        json!({"index": "timestamp", "columns": "node", "values": "lmp"});
    let schema = load_schema_from_value(&doc).unwrap();
    let pivot = schema.operation("dalmp_node").unwrap().pivot.clone().unwrap();
    assert_eq!(
        pivot,
        PivotSpec::new("timestamp", "node").with_values("lmp")
    );
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_missing_paths_is_config_error() {
    let err = load_schema_from_value(&json!({"openapi": "3.0.2"})).unwrap_err();
    assert!(matches!(err, crate::Error::Config { .. }));
}

#[test]
fn test_empty_paths_is_config_error() {
    let err = load_schema_from_value(&json!({"paths": {}})).unwrap_err();
    assert!(matches!(err, crate::Error::Config { .. }));
}

#[test]
fn test_malformed_document_is_config_error() {
    let err = load_schema_from_str("{ not json").unwrap_err();
    assert!(matches!(err, crate::Error::Config { .. }));

    let err = load_schema_from_str("").unwrap_err();
    assert!(matches!(err, crate::Error::Config { .. }));

    let err = load_schema_from_str("- just\n- a list\n").unwrap_err();
    assert!(matches!(err, crate::Error::Config { .. }));
}

#[test]
fn test_unresolved_reference_is_config_error() {
    let mut doc = minimal_doc();
    doc["paths"]["/dalmp/node"]["get"]["parameters"][1]["schema"] =
        json!({"$ref": "#/components/schemas/Missing"});
    let err = load_schema_from_value(&doc).unwrap_err();
    assert!(err.to_string().contains("Unresolved reference"));
}

#[test]
fn test_duplicate_method_names_rejected() {
    let doc = json!({
        "paths": {
            "/dalmp/node": {"get": {}},
            "/dalmp-node": {"get": {}}
        }
    });
    let err = load_schema_from_value(&doc).unwrap_err();
    assert!(err.to_string().contains("Duplicate method name 'dalmp_node'"));
}

#[test]
fn test_pivot_unknown_column_rejected() {
    let mut doc = minimal_doc();
    doc["paths"]["/dalmp/node"]["get"]["x-pivot"] =
        json!({"index": "timestamp", "columns": "zone"});
    let err = load_schema_from_value(&doc).unwrap_err();
    assert!(err.to_string().contains("unknown column 'zone'"));
}

#[test]
fn test_pivot_incomplete_rejected() {
    let mut doc = minimal_doc();
    doc["paths"]["/dalmp/node"]["get"]["x-pivot"] = json!({"index": "timestamp"});
    assert!(load_schema_from_value(&doc).is_err());
}

// ============================================================================
// File Loading Tests
// ============================================================================

#[test]
fn test_load_schema_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(minimal_doc().to_string().as_bytes()).unwrap();

    let schema = load_schema(file.path()).unwrap();
    assert_eq!(schema.title(), "Test");
}

#[test]
fn test_load_schema_missing_file() {
    let err = load_schema("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, crate::Error::Config { .. }));
    assert!(err.to_string().contains("not found"));
}
