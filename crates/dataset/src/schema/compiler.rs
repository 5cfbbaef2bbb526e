//! Compile field declarations into a schema.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::alias::AliasResolver;
use crate::error::{DatasetError, Result};

use super::field::{FieldSchema, Schema};
use super::types::{Mask, TypeTag};

/// The raw field definition of a dataset kind.
///
/// Accept entries are either a bare name or an alias group such as
/// `"mi:me:moi"`, where the first segment is the master. Every other map may
/// be keyed by the master or by any alias.
#[derive(Debug, Clone, Default)]
pub struct FieldDeclarations {
    /// Accepted keys and alias groups, in order.
    pub accept: Vec<String>,
    /// Keys that must be supplied.
    pub required: Vec<String>,
    /// Explicit default values.
    pub defaults: IndexMap<String, Value>,
    /// Masks, plain or `/delimited/flags`.
    pub matches: IndexMap<String, String>,
    /// Type unions such as `double|int`.
    pub types: IndexMap<String, String>,
    /// Descriptions.
    pub descriptions: IndexMap<String, String>,
    /// Carry unknown keys through instead of reporting them.
    pub additional_properties: bool,
}

impl FieldDeclarations {
    /// Start from a list of accepted keys.
    pub fn new<I, S>(accept: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accept: accept.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Mark keys as required.
    pub fn require<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Set a default value.
    pub fn default_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    /// Set a mask.
    pub fn pattern(mut self, key: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.matches.insert(key.into(), pattern.into());
        self
    }

    /// Set a type union.
    pub fn types(mut self, key: impl Into<String>, union: impl Into<String>) -> Self {
        self.types.insert(key.into(), union.into());
        self
    }

    /// Set a description.
    pub fn describe(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.descriptions.insert(key.into(), text.into());
        self
    }

    /// Allow keys outside the schema.
    pub fn with_additional_properties(mut self, allowed: bool) -> Self {
        self.additional_properties = allowed;
        self
    }
}

/// Turns [`FieldDeclarations`] into a [`Schema`].
pub struct SchemaCompiler {
    name: String,
}

impl SchemaCompiler {
    /// Create a compiler for the named dataset.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Compile declarations.
    ///
    /// Fails on malformed or duplicated keys, empty type unions, and masks
    /// that are not valid regular expressions.
    pub fn compile(&self, decl: &FieldDeclarations) -> Result<Schema> {
        let mut resolver = AliasResolver::new(&self.name);
        let mut fields = IndexMap::new();

        for entry in &decl.accept {
            let group = self.split_group(entry)?;
            resolver.insert_group(group.clone())?;

            let field = self.compile_field(&group, decl)?;
            fields.insert(field.id.clone(), field);
        }

        self.warn_orphans(decl, &resolver);

        debug!(
            dataset = %self.name,
            fields = fields.len(),
            "Compiled dataset schema"
        );

        Ok(Schema::new(
            self.name.clone(),
            fields,
            resolver,
            decl.additional_properties,
        ))
    }

    fn split_group(&self, entry: &str) -> Result<Vec<String>> {
        let group: Vec<String> = entry.split(':').map(|s| s.trim().to_string()).collect();
        if group.iter().any(String::is_empty) {
            return Err(DatasetError::config(
                &self.name,
                format!("malformed key declaration '{}'", entry),
            ));
        }
        Ok(group)
    }

    fn compile_field(&self, group: &[String], decl: &FieldDeclarations) -> Result<FieldSchema> {
        let mut field = FieldSchema::new(group[0].clone());
        field.aliases = group[1..].to_vec();
        field.required = group.iter().any(|name| decl.required.contains(name));

        if let Some(union) = lookup(group, &decl.types) {
            field.types = TypeTag::parse_union(union);
            if field.types.is_empty() {
                return Err(DatasetError::config(
                    &self.name,
                    format!("empty type declaration for '{}'", field.id),
                ));
            }
        }

        if let Some(pattern) = lookup(group, &decl.matches) {
            field.mask = Some(Mask::new(pattern).map_err(|source| DatasetError::Pattern {
                field: field.id.clone(),
                source,
            })?);
        }

        field.default = match lookup(group, &decl.defaults) {
            Some(value) => value.clone(),
            None => field
                .types
                .first()
                .map(TypeTag::default_value)
                .unwrap_or_else(|| Value::String(String::new())),
        };

        if let Some(text) = lookup(group, &decl.descriptions) {
            field.description = text.clone();
        }

        Ok(field)
    }

    fn warn_orphans(&self, decl: &FieldDeclarations, resolver: &AliasResolver) {
        let declared = decl
            .defaults
            .keys()
            .chain(decl.matches.keys())
            .chain(decl.types.keys())
            .chain(decl.descriptions.keys())
            .chain(decl.required.iter());

        for key in declared {
            if !resolver.contains(key) {
                warn!(dataset = %self.name, key = %key, "Declaration names a key that is not accepted");
            }
        }
    }
}

/// First entry for the master, then for each alias in declared order.
fn lookup<'a, T>(group: &[String], map: &'a IndexMap<String, T>) -> Option<&'a T> {
    group.iter().find_map(|name| map.get(name))
}
