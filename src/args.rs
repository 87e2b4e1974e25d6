//! Call arguments
//!
//! Arguments are passed by name, the way the API declares them. Values keep
//! their native type until the request is built, so a date can be given as
//! `"2021-01-01"` or as a `NaiveDate` and produce the same request.

use crate::timestamp::{format_timestamp, normalize_timestamp, parse_timestamp};
use crate::types::ParamKind;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use std::collections::BTreeMap;

/// A single argument value
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    List(Vec<ArgValue>),
}

impl ArgValue {
    /// Render the value for a parameter of the given kind.
    ///
    /// Datetime parameters accept native timestamps or any recognized
    /// timestamp string; other strings are rejected.
    pub fn render_for(&self, kind: ParamKind) -> Result<String, String> {
        match (kind, self) {
            (ParamKind::DateTime, ArgValue::Text(s)) => normalize_timestamp(s)
                .ok_or_else(|| format!("'{s}' is not a recognized timestamp")),
            (
                ParamKind::DateTime,
                ArgValue::Integer(_) | ArgValue::Float(_) | ArgValue::Bool(_),
            ) => Err(format!("expected a timestamp, got {}", self.render())),
            (_, ArgValue::List(items)) => items
                .iter()
                .map(|item| item.render_for(kind))
                .collect::<Result<Vec<_>, _>>()
                .map(|parts| parts.join(",")),
            _ => Ok(self.render()),
        }
    }

    /// Render the value as-is
    pub fn render(&self) -> String {
        match self {
            ArgValue::Text(s) => s.clone(),
            ArgValue::Integer(i) => i.to_string(),
            ArgValue::Float(f) => f.to_string(),
            ArgValue::Bool(b) => b.to_string(),
            ArgValue::DateTime(dt) => format_timestamp(dt),
            ArgValue::List(items) => items
                .iter()
                .map(ArgValue::render)
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Timestamp view of the value, if it is one
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            ArgValue::DateTime(dt) => Some(*dt),
            ArgValue::Text(s) => parse_timestamp(s),
            _ => None,
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Text(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Text(value)
    }
}

impl From<&String> for ArgValue {
    fn from(value: &String) -> Self {
        ArgValue::Text(value.clone())
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Integer(value)
    }
}

impl From<i32> for ArgValue {
    fn from(value: i32) -> Self {
        ArgValue::Integer(value.into())
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::Float(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<NaiveDateTime> for ArgValue {
    fn from(value: NaiveDateTime) -> Self {
        ArgValue::DateTime(value)
    }
}

impl From<NaiveDate> for ArgValue {
    fn from(value: NaiveDate) -> Self {
        ArgValue::DateTime(value.and_time(NaiveTime::MIN))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for ArgValue {
    fn from(value: DateTime<Tz>) -> Self {
        ArgValue::DateTime(value.naive_local())
    }
}

impl<T: Into<ArgValue>> From<Vec<T>> for ArgValue {
    fn from(values: Vec<T>) -> Self {
        ArgValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Named arguments for one call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: BTreeMap<String, ArgValue>,
}

impl Arguments {
    /// Create an empty argument set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument
    #[must_use]
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set an argument, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ArgValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ArgValue> {
        self.values.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Argument names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse a `name=value` pair, as given on the command line
    pub fn parse_pair(pair: &str) -> Result<(String, ArgValue), String> {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected name=value, got '{pair}'"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("empty argument name in '{pair}'"));
        }
        Ok((name.to_string(), ArgValue::Text(value.trim().to_string())))
    }
}

impl<K: Into<String>, V: Into<ArgValue>> FromIterator<(K, V)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Arguments::new();
        for (k, v) in iter {
            args.insert(k, v);
        }
        args
    }
}
