//! Typed reads over raw attribute maps.
//!
//! Every accessor is total: a missing or null attribute maps to
//! [`ERROR_SENTINEL`] (or zero for numbers) and unparsable numbers are logged.

use serde_json::Value;

use crate::model::ERROR_SENTINEL;
use crate::source::Record;

/// Attribute reader bound to the category that requested the record.
#[derive(Debug, Clone, Copy)]
pub struct Attrs<'a> {
    category: &'static str,
    record: &'a Record,
}

impl<'a> Attrs<'a> {
    #[must_use]
    pub fn new(category: &'static str, record: &'a Record) -> Self {
        Self { category, record }
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.record.get(field).filter(|value| !value.is_null())
    }

    /// Attribute as text, if present. Numbers and booleans are rendered.
    #[must_use]
    pub fn opt_text(&self, field: &str) -> Option<String> {
        self.get(field).and_then(scalar_text)
    }

    /// Attribute as text, or [`ERROR_SENTINEL`] when it is absent.
    #[must_use]
    pub fn text(&self, field: &str) -> String {
        self.text_or(field, ERROR_SENTINEL)
    }

    #[must_use]
    pub fn text_or(&self, field: &str, fallback: &str) -> String {
        self.opt_text(field).unwrap_or_else(|| fallback.to_owned())
    }

    /// First element of an array attribute (or the scalar itself).
    #[must_use]
    pub fn first_text(&self, field: &str) -> Option<String> {
        match self.get(field)? {
            Value::Array(items) => items.iter().find_map(scalar_text),
            other => scalar_text(other),
        }
    }

    /// Unsigned attribute. Strings are parsed; anything unparsable becomes
    /// zero and is logged.
    #[must_use]
    pub fn uint(&self, field: &str) -> u64 {
        let Some(value) = self.get(field) else {
            return 0;
        };
        let parsed = match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        parsed.unwrap_or_else(|| {
            tracing::warn!(
                category = self.category,
                field,
                value = %value,
                "Attribute is not an unsigned integer, using 0"
            );
            0
        })
    }

    /// Boolean attribute; absent or non-boolean counts as `false`.
    #[must_use]
    pub fn flag(&self, field: &str) -> bool {
        match self.get(field) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
