//! WireRecord and ErrorSet - the flat shapes exchanged with callers
//!
//! A wire record is one item on the wire (input or output). An error set is
//! the structured validation failure attached to exactly one record position.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// One item on the wire: field name -> primitive/structured value.
pub type WireRecord = serde_json::Map<String, Value>;

/// Key under which object-level (cross-field) errors are reported.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Message for a value already held by another record in a unique field
pub fn unique_message(field: &str) -> String {
    format!("record with this {field} already exists.")
}

/// Validation errors for one record, grouped by field name.
///
/// Field names are kept sorted so the rendered form is deterministic.
/// Serializes as `{"field": ["message", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorSet(BTreeMap<String, Vec<String>>);

impl ErrorSet {
    /// Create an empty error set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an error set holding a single message
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Append a message under `field`
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Merge another error set, keeping each message under its original field
    pub fn merge(&mut self, other: ErrorSet) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Messages recorded for `field`
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields carrying at least one message
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Field names with errors, in sorted order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Convert into a `Result`, `Ok(())` when no errors were recorded
    pub fn into_result(self) -> Result<(), ErrorSet> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// JSON type name used in error messages
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Convert an arbitrary JSON value into a wire record
///
/// # Errors
/// Returns an error set under [`NON_FIELD_ERRORS`] when `value` is not an object.
pub fn wire_record_from_value(value: Value) -> Result<WireRecord, ErrorSet> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ErrorSet::single(
            NON_FIELD_ERRORS,
            format!(
                "invalid data: expected an object, got {}",
                json_type_name(&other)
            ),
        )),
    }
}
