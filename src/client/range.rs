//! Time-range splitting for long queries

use crate::args::{ArgValue, Arguments};
use crate::error::{Error, Result};
use chrono::{Duration, NaiveDateTime};

/// A time range to fetch in fixed-size windows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRequest {
    /// Parameter receiving each window's start
    pub start_param: String,
    /// Parameter receiving each window's end
    pub end_param: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Maximum window length
    pub step: Duration,
}

impl RangeRequest {
    /// Windows over `start`/`end` parameters
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, step: Duration) -> Self {
        Self {
            start_param: "start".to_string(),
            end_param: "end".to_string(),
            start,
            end,
            step,
        }
    }

    /// Use different parameter names for the window bounds
    #[must_use]
    pub fn with_params(
        mut self,
        start_param: impl Into<String>,
        end_param: impl Into<String>,
    ) -> Self {
        self.start_param = start_param.into();
        self.end_param = end_param.into();
        self
    }

    /// Consecutive `[start, end)` windows of at most `step`
    pub fn windows(&self, operation: &str) -> Result<Vec<(NaiveDateTime, NaiveDateTime)>> {
        if self.step <= Duration::zero() {
            return Err(Error::argument(operation, "range step must be positive"));
        }
        if self.start >= self.end {
            return Err(Error::argument(
                operation,
                format!("range start {} is not before end {}", self.start, self.end),
            ));
        }

        let mut windows = Vec::new();
        let mut cursor = self.start;
        while cursor < self.end {
            let next = cursor
                .checked_add_signed(self.step)
                .map_or(self.end, |n| n.min(self.end));
            windows.push((cursor, next));
            cursor = next;
        }
        Ok(windows)
    }

    /// Caller arguments with one window's bounds filled in
    pub(crate) fn window_args(
        &self,
        args: &Arguments,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Arguments {
        let mut args = args.clone();
        args.insert(self.start_param.clone(), ArgValue::DateTime(start));
        args.insert(self.end_param.clone(), ArgValue::DateTime(end));
        args
    }
}
