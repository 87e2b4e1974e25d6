//! Schema loader module
//!
//! Reads the API's OpenAPI interface description into a map from method
//! name to [`OperationDescriptor`].
//!
//! # Features
//!
//! - **JSON or YAML**: Either serialization of the document is accepted
//! - **Reference Resolution**: Local `$ref`s to component schemas
//! - **Pivot Metadata**: `x-pivot` extension, or a guess from the row schema
//! - **Bundled Copy**: The released document is compiled into the crate

mod loader;
mod openapi;
mod types;

pub use loader::{
    bundled_schema, fetch_schema, load_schema, load_schema_from_str, load_schema_from_value,
    SchemaSource, BUNDLED_SCHEMA, REMOTE_SCHEMA_PATH,
};
pub use openapi::parse_document;
pub use types::{
    ApiSchema, OperationDescriptor, ParameterDescriptor, PivotSource, PivotSpec, ResponseColumn,
    ResponseShape, RESERVED_PARAMS,
};

#[cfg(test)]
mod tests;
