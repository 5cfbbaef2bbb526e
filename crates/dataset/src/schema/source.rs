//! Where a dataset kind gets its field definition from.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use tracing::debug;

use crate::error::{DatasetError, Result};

use super::compiler::{FieldDeclarations, SchemaCompiler};
use super::field::Schema;

/// The definition of a dataset kind.
#[derive(Debug, Clone)]
pub enum SchemaSource {
    /// Declarations written in code.
    Declarations(FieldDeclarations),
    /// An embedded JSON-Schema document.
    JsonSchema(String),
    /// A JSON-Schema document on disk.
    JsonSchemaFile(PathBuf),
}

impl SchemaSource {
    /// Load the source and compile it for the named dataset.
    pub fn compile(&self, name: &str) -> Result<Schema> {
        let declarations = self.declarations(name)?;
        SchemaCompiler::new(name).compile(&declarations)
    }

    /// Resolve the source into declarations.
    pub fn declarations(&self, name: &str) -> Result<FieldDeclarations> {
        match self {
            SchemaSource::Declarations(decl) => Ok(decl.clone()),
            SchemaSource::JsonSchema(text) => from_json_schema(name, text),
            SchemaSource::JsonSchemaFile(path) => {
                let text = fs::read_to_string(path).map_err(|e| DatasetError::Io {
                    path: path.clone(),
                    source: e,
                })?;
                debug!(dataset = %name, path = %path.display(), "Loaded JSON schema");
                from_json_schema(name, &text)
            }
        }
    }
}

impl From<FieldDeclarations> for SchemaSource {
    fn from(decl: FieldDeclarations) -> Self {
        SchemaSource::Declarations(decl)
    }
}

/// Translate a JSON-Schema document into declarations.
///
/// Reads `properties` in document order with their `type`, `default`,
/// `pattern`, `description` and `aliases` keywords, plus the top-level
/// `required` and `additionalProperties`.
pub fn from_json_schema(name: &str, text: &str) -> Result<FieldDeclarations> {
    let doc: Value = serde_json::from_str(text)?;
    let properties = doc
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| DatasetError::config(name, "JSON schema has no \"properties\" object"))?;

    let mut decl = FieldDeclarations::default();

    for (key, property) in properties {
        let aliases = string_list(property.get("aliases"));
        if let Some(bad) = std::iter::once(key).chain(&aliases).find(|n| n.contains(':')) {
            return Err(DatasetError::config(
                name,
                format!("property or alias name '{}' contains ':'", bad),
            ));
        }
        decl.accept.push(
            std::iter::once(key.clone())
                .chain(aliases)
                .collect::<Vec<_>>()
                .join(":"),
        );

        if let Some(union) = type_union(property.get("type")) {
            decl.types.insert(key.clone(), union);
        }
        if let Some(default) = property.get("default") {
            decl.defaults.insert(key.clone(), default.clone());
        }
        if let Some(pattern) = property.get("pattern").and_then(Value::as_str) {
            decl.matches.insert(key.clone(), pattern.to_string());
        }
        if let Some(text) = property.get("description").and_then(Value::as_str) {
            decl.descriptions.insert(key.clone(), text.to_string());
        }
    }

    decl.required = string_list(doc.get("required"));
    decl.additional_properties = doc
        .get("additionalProperties")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Ok(decl)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn type_union(value: Option<&Value>) -> Option<String> {
    let names: Vec<&str> = match value? {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => return None,
    };

    let tags: Vec<&str> = names
        .into_iter()
        .map(|n| if n == "number" { "double|integer" } else { n })
        .collect();

    if tags.is_empty() {
        None
    } else {
        Some(tags.join("|"))
    }
}
