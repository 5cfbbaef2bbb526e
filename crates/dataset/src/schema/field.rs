//! Compiled field and dataset schemas.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::alias::AliasResolver;
use crate::error::{DatasetError, Result};

use super::types::{Mask, TypeTag};

/// Schema for a single master key.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSchema {
    /// Master key name.
    pub id: String,
    /// Value used when the field is absent from the input.
    pub default: Value,
    /// Same as `id`.
    pub master: String,
    /// Always false; aliases resolve to their master's entry.
    pub is_alias: bool,
    /// Alternate accepted names, in declared order.
    pub aliases: Vec<String>,
    /// Whether the master or one of its aliases must be supplied.
    pub required: bool,
    /// Pattern the stringified value must match.
    pub mask: Option<Mask>,
    /// Accepted types; empty means unconstrained.
    pub types: Vec<TypeTag>,
    /// Human-readable text.
    pub description: String,
}

impl FieldSchema {
    /// Create a field with no aliases and no constraints.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            master: id.clone(),
            id,
            default: Value::String(String::new()),
            is_alias: false,
            aliases: Vec::new(),
            required: false,
            mask: None,
            types: Vec::new(),
            description: String::new(),
        }
    }

    /// Whether `value` satisfies at least one declared type.
    pub fn accepts_type(&self, value: &Value, satisfies_class: impl Fn(&str, &Value) -> bool) -> bool {
        self.types.is_empty() || self.types.iter().any(|t| t.matches(value, &satisfies_class))
    }
}

/// The compiled schema of one dataset kind.
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    /// Dataset name used in messages.
    pub name: String,
    /// Fields keyed by master, in declaration order.
    pub fields: IndexMap<String, FieldSchema>,
    /// Whether keys outside the schema are carried through untouched.
    pub additional_properties: bool,
    #[serde(skip)]
    resolver: AliasResolver,
}

impl Schema {
    pub(crate) fn new(
        name: impl Into<String>,
        fields: IndexMap<String, FieldSchema>,
        resolver: AliasResolver,
        additional_properties: bool,
    ) -> Self {
        Self {
            name: name.into(),
            fields,
            additional_properties,
            resolver,
        }
    }

    /// The alias resolver built from this schema.
    pub fn resolver(&self) -> &AliasResolver {
        &self.resolver
    }

    /// Field for a master or any alias.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.resolver.master_of(name).and_then(|m| self.fields.get(m))
    }

    /// Field for a master or any alias, failing on unknown names.
    pub fn require_field(&self, name: &str) -> Result<&FieldSchema> {
        self.field(name)
            .ok_or_else(|| DatasetError::unknown_key(&self.name, name))
    }

    /// Master key names in declaration order.
    pub fn masters(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Master to default value, in declaration order.
    pub fn defaults(&self) -> Map<String, Value> {
        self.fields
            .values()
            .map(|f| (f.id.clone(), f.default.clone()))
            .collect()
    }

    /// Number of master fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}
