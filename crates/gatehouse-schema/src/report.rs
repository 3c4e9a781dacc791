//! # Validation Report
//!
//! The per-request outcome of running a compiled schema against a value
//! mapping: field name → error description. An empty report means the
//! values satisfied the schema. A non-empty report is the expected,
//! recoverable outcome of validating bad input — it is answered as an HTTP
//! 400 body, never raised as an error.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Mapping of field name to error description.
///
/// Serializes transparently as a JSON object, which is exactly the wire
/// format of the middleware's 400 response body. At most one message is
/// recorded per field; the first violation wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationReport {
    errors: BTreeMap<String, String>,
}

impl ValidationReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no violations were recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with a recorded violation.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The recorded message for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Record a violation for `field` unless one is already present.
    pub fn record(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Iterate over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Consume the report and return the inner map.
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.errors
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {field}: {message}")?;
        }
        Ok(())
    }
}
