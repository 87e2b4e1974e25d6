//! Method registry
//!
//! One [`ApiMethod`] per operation in the interface description, dispatched
//! by name.

use super::config::CallOptions;
use super::facade::{CallOutput, IsoStream};
use crate::args::Arguments;
use crate::error::{Error, Result};
use crate::schema::{ApiSchema, OperationDescriptor};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

/// A callable API operation
#[derive(Debug, Clone)]
pub struct ApiMethod {
    descriptor: Arc<OperationDescriptor>,
}

impl ApiMethod {
    pub fn new(descriptor: Arc<OperationDescriptor>) -> Self {
        Self { descriptor }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &Arc<OperationDescriptor> {
        &self.descriptor
    }

    /// Run the operation on a client
    pub async fn call(
        &self,
        client: &IsoStream,
        args: &Arguments,
        options: CallOptions,
    ) -> Result<CallOutput> {
        client.invoke(&self.descriptor, args, options).await
    }

    /// Human-readable documentation of the method's parameters
    pub fn docs(&self) -> String {
        let op = &self.descriptor;
        let mut out = format!("Wrapper method for API call to {}\n", op.path);
        if let Some(summary) = &op.summary {
            let _ = writeln!(out, "{summary}");
        }
        if let Some(description) = &op.description {
            let _ = writeln!(out, "\n{description}");
        }

        out.push_str("\nParameters\n----------\n");
        for param in &op.parameters {
            let _ = writeln!(
                out,
                "{} : {}, required = {}",
                param.name,
                param.type_label(),
                param.required
            );
            if let Some(desc) = &param.description {
                let _ = writeln!(out, "    {desc}");
            }
        }
        out.push_str(
            "as_table : bool, default = true\n    \
             Return the result as a table, or as raw rows\n\
             pivot : bool, default = true\n    \
             If returning a table, whether to pivot it to a wide format\n",
        );

        out.push_str("\nReturns\n-------\n");
        match &op.response.type_name {
            Some(name) => {
                let _ = writeln!(out, "rows of {name}, or a table");
            }
            None => out.push_str("rows, or a table\n"),
        }
        if let Some(pivot) = &op.pivot {
            let _ = writeln!(
                out,
                "    pivoted on index '{}' by '{}'",
                pivot.index, pivot.columns
            );
        }
        out
    }
}

/// Name-to-method dispatch table
#[derive(Debug, Clone, Default)]
pub struct MethodRegistry {
    methods: BTreeMap<String, ApiMethod>,
}

impl MethodRegistry {
    /// One method per operation in the schema
    pub fn build(schema: &ApiSchema) -> Self {
        let methods = schema
            .operations()
            .map(|op| (op.name.clone(), ApiMethod::new(Arc::clone(op))))
            .collect();
        Self { methods }
    }

    pub fn get(&self, name: &str) -> Option<&ApiMethod> {
        self.methods.get(name)
    }

    /// Look up a method, failing with [`Error::UnknownMethod`]
    pub fn resolve(&self, name: &str) -> Result<&ApiMethod> {
        self.get(name).ok_or_else(|| Error::unknown_method(name))
    }

    /// Method names in ascending order, optionally restricted to those
    /// containing `filter` (case-insensitive)
    pub fn names(&self, filter: Option<&str>) -> Vec<String> {
        let needle = filter.map(str::to_lowercase);
        self.methods
            .keys()
            .filter(|name| {
                needle
                    .as_deref()
                    .map_or(true, |n| name.to_lowercase().contains(n))
            })
            .cloned()
            .collect()
    }

    /// Documentation for a method
    pub fn describe(&self, name: &str) -> Option<String> {
        self.get(name).map(ApiMethod::docs)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ApiMethod> {
        self.methods.values()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
