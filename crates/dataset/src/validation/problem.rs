//! Validation problems grouped by field.

use indexmap::IndexMap;
use serde::Serialize;

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    /// Master key, or the offending key for unknown keys.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

impl Problem {
    /// Create a problem for a field.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Problems keyed by field, in report order.
///
/// A field missing from the map has no problems. Messages for one field
/// keep the order they were found in and are never deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Problems {
    by_field: IndexMap<String, Vec<String>>,
}

impl Problems {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message for a field.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.by_field
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Messages for a field.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.by_field.get(field).map(Vec::as_slice)
    }

    /// Whether a field has any problem.
    pub fn contains(&self, field: &str) -> bool {
        self.by_field.contains_key(field)
    }

    /// The first message of the first field with problems.
    pub fn first(&self) -> Option<(&str, &str)> {
        self.by_field
            .iter()
            .find_map(|(field, messages)| messages.first().map(|m| (field.as_str(), m.as_str())))
    }

    /// Number of fields with problems.
    pub fn len(&self) -> usize {
        self.by_field.len()
    }

    /// True when no field has problems.
    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }

    /// Total number of messages.
    pub fn message_count(&self) -> usize {
        self.by_field.values().map(Vec::len).sum()
    }

    /// Fields with problems, in report order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.by_field.keys().map(String::as_str)
    }

    /// Iterate fields with their messages.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.by_field
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

impl<'a> IntoIterator for &'a Problems {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = indexmap::map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.by_field.iter()
    }
}
