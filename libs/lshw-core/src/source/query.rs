//! Structured queries against the record source.
//!
//! A [`Query`] names one authorized [`Entity`], the attributes to fetch and
//! an optional [`Predicate`]. Sources consume the structure directly; the
//! `Display` impl renders escaped WQL for sources that speak it and for logs.

use std::fmt;

use serde_json::Value;

use super::Record;
use super::entity::Entity;
use crate::error::InventoryError;

/// Filter applied to the records of one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Attribute equals the value (strings compare case-insensitively).
    Eq(&'static str, Value),
    /// Attribute contains the substring, case-insensitively (`LIKE "%v%"`).
    Contains(&'static str, String),
    /// Attribute is boolean `true`.
    IsTrue(&'static str),
    Not(Box<Predicate>),
    And(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    #[must_use]
    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Self::Eq(field, value.into())
    }

    #[must_use]
    pub fn contains(field: &'static str, needle: impl Into<String>) -> Self {
        Self::Contains(field, needle.into())
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    fn push_fields(&self, out: &mut Vec<&'static str>) {
        match self {
            Self::Eq(field, _) | Self::Contains(field, _) | Self::IsTrue(field) => out.push(*field),
            Self::Not(inner) => inner.push_fields(out),
            Self::And(left, right) => {
                left.push_fields(out);
                right.push_fields(out);
            }
        }
    }

    /// Evaluate against a raw record. Missing attributes never match a
    /// positive predicate.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Eq(field, expected) => record
                .get(*field)
                .is_some_and(|actual| values_equal(actual, expected)),
            Self::Contains(field, needle) => record
                .get(*field)
                .and_then(Value::as_str)
                .is_some_and(|haystack| {
                    haystack
                        .to_ascii_lowercase()
                        .contains(&needle.to_ascii_lowercase())
                }),
            Self::IsTrue(field) => record.get(*field).is_some_and(is_truthy),
            Self::Not(inner) => !inner.matches(record),
            Self::And(left, right) => left.matches(record) && right.matches(record),
        }
    }
}

fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::String(a), Value::String(b)) => a.eq_ignore_ascii_case(b),
        (Value::Number(a), Value::String(b)) | (Value::String(b), Value::Number(a)) => {
            a.to_string() == b.trim()
        }
        _ => actual == expected,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq(field, Value::String(s)) => write!(f, "{field} = \"{}\"", escape(s)),
            Self::Eq(field, other) => write!(f, "{field} = {other}"),
            Self::Contains(field, needle) => write!(f, "{field} LIKE \"%{}%\"", escape(needle)),
            Self::IsTrue(field) => write!(f, "{field} = TRUE"),
            Self::Not(inner) => write!(f, "NOT ({inner})"),
            Self::And(left, right) => write!(f, "{left} AND {right}"),
        }
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// A validated-before-use select over one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    entity: Entity,
    fields: Vec<&'static str>,
    predicate: Option<Predicate>,
}

impl Query {
    #[must_use]
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            fields: Vec::new(),
            predicate: None,
        }
    }

    #[must_use]
    pub fn fields(mut self, fields: &[&'static str]) -> Self {
        self.fields.extend_from_slice(fields);
        self
    }

    /// Add a filter; successive filters are combined with `AND`.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    #[must_use]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    #[must_use]
    pub fn field_names(&self) -> &[&'static str] {
        &self.fields
    }

    #[must_use]
    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    /// Check every attribute name before the query reaches a source.
    ///
    /// # Errors
    /// Returns [`InventoryError::InvalidField`] for any selected or filtered
    /// attribute that is not a plain identifier.
    pub fn validate(&self) -> Result<(), InventoryError> {
        let mut names = self.fields.clone();
        if let Some(predicate) = &self.predicate {
            predicate.push_fields(&mut names);
        }
        names
            .into_iter()
            .find(|field| !is_identifier(field))
            .map_or(Ok(()), |bad| Err(InventoryError::InvalidField(bad.to_owned())))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = if self.fields.is_empty() {
            "*".to_owned()
        } else {
            self.fields.join(",")
        };
        write!(f, "SELECT {fields} FROM {}", self.entity)?;
        if let Some(predicate) = &self.predicate {
            write!(f, " WHERE {predicate}")?;
        }
        Ok(())
    }
}
