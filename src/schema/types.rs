//! Operation descriptor types

use crate::types::{ColumnKind, Method, ParamKind, ParamLocation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Parameter names the client fills in itself
pub const RESERVED_PARAMS: &[&str] = &["api_key"];

/// One callable remote operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// Method name, unique within a schema
    pub name: String,
    /// HTTP method
    pub method: Method,
    /// Path template, e.g. `/dalmp/node`
    pub path: String,
    /// One-line summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Caller-supplied parameters, in declaration order
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
    /// Shape of one response row
    #[serde(default)]
    pub response: ResponseShape,
    /// How to reshape the rows into a wide table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot: Option<PivotSpec>,
}

impl OperationDescriptor {
    /// Look up a parameter by name
    pub fn parameter(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Parameters the caller must supply
    pub fn required_parameters(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.parameters.iter().filter(|p| p.required)
    }

    /// Declared kind of a response column
    pub fn column_kind(&self, column: &str) -> Option<ColumnKind> {
        self.response
            .columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.kind)
    }
}

/// One operation parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    #[serde(default)]
    pub location: ParamLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub kind: ParamKind,
    /// Name of the referenced component schema, e.g. `ISO`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

impl ParameterDescriptor {
    /// Create a required query parameter of the given kind
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            location: ParamLocation::Query,
            required: true,
            kind,
            type_name: None,
            description: None,
            enum_values: Vec::new(),
        }
    }

    /// Mark the parameter optional
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Set the parameter location
    #[must_use]
    pub fn located(mut self, location: ParamLocation) -> Self {
        self.location = location;
        if location == ParamLocation::Path {
            self.required = true;
        }
        self
    }

    /// Human-readable type, e.g. `string, ercot,pjm`
    pub fn type_label(&self) -> String {
        if self.enum_values.is_empty() {
            self.kind.to_string()
        } else {
            format!("{}, {}", self.kind, self.enum_values.join(","))
        }
    }
}

/// Declared shape of a response row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseShape {
    /// Name of the row component schema, e.g. `LMPRecord`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Columns in declaration order
    #[serde(default)]
    pub columns: Vec<ResponseColumn>,
}

impl ResponseShape {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// First column of the given kind
    pub fn first_of(&self, kind: ColumnKind) -> Option<&ResponseColumn> {
        self.columns.iter().find(|c| c.kind == kind)
    }
}

/// One declared response column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseColumn {
    pub name: String,
    pub kind: ColumnKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ResponseColumn {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
        }
    }
}

/// Where a pivot spec came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotSource {
    /// `x-pivot` extension on the operation
    #[default]
    Declared,
    /// Derived from the response columns at load time
    Guessed,
}

/// Pivot metadata: one output row per `index` value, one output column per
/// `columns` value, cells from `values` (or every numeric column if unset)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotSpec {
    pub index: String,
    pub columns: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<String>,
    #[serde(default)]
    pub source: PivotSource,
}

impl PivotSpec {
    pub fn new(index: impl Into<String>, columns: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            columns: columns.into(),
            values: None,
            source: PivotSource::Declared,
        }
    }

    /// Restrict the cells to one value column
    #[must_use]
    pub fn with_values(mut self, values: impl Into<String>) -> Self {
        self.values = Some(values.into());
        self
    }

    /// Guess a pivot from the response shape: the first datetime column is
    /// the index and the first text column is the key.
    pub fn guess(shape: &ResponseShape) -> Option<Self> {
        let index = shape.first_of(ColumnKind::DateTime)?;
        let columns = shape.first_of(ColumnKind::Text)?;
        Some(Self {
            index: index.name.clone(),
            columns: columns.name.clone(),
            values: None,
            source: PivotSource::Guessed,
        })
    }
}

/// The loaded interface description
#[derive(Debug, Clone, Default)]
pub struct ApiSchema {
    title: String,
    version: String,
    operations: BTreeMap<String, Arc<OperationDescriptor>>,
}

impl ApiSchema {
    /// Create a schema from descriptors. Names must already be unique.
    pub(crate) fn new(
        title: impl Into<String>,
        version: impl Into<String>,
        operations: BTreeMap<String, Arc<OperationDescriptor>>,
    ) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            operations,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Look up an operation by name
    pub fn operation(&self, name: &str) -> Option<&Arc<OperationDescriptor>> {
        self.operations.get(name)
    }

    /// All operations, ordered by name
    pub fn operations(&self) -> impl Iterator<Item = &Arc<OperationDescriptor>> {
        self.operations.values()
    }

    /// All operation names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.operations.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
