//! Checks run against an imported record.

use serde_json::Value;
use tracing::debug;

use crate::record::{CanonicalRecord, KeyPolicy};
use crate::schema::{FieldSchema, Schema, TypeTag, union_name};

use super::problem::{Problem, Problems};

/// Trait for record checks.
pub trait Check {
    /// Run the check and return the problems found.
    fn check(&self, schema: &Schema, record: &CanonicalRecord, policy: &dyn KeyPolicy) -> Vec<Problem>;
}

/// Reports keys that are neither accepted nor ignorable.
pub struct UnknownKeyCheck;

impl Check for UnknownKeyCheck {
    fn check(&self, schema: &Schema, record: &CanonicalRecord, _policy: &dyn KeyPolicy) -> Vec<Problem> {
        record
            .unknown_keys()
            .iter()
            .map(|key| {
                Problem::new(
                    key.as_str(),
                    format!("\"{}\" is not an accepted key in {}", key, schema.name),
                )
            })
            .collect()
    }
}

/// Reports required fields absent under every name of their group.
pub struct RequiredCheck;

impl Check for RequiredCheck {
    fn check(&self, schema: &Schema, record: &CanonicalRecord, _policy: &dyn KeyPolicy) -> Vec<Problem> {
        schema
            .fields
            .values()
            .filter(|field| field.required && record.supplied(&field.id).is_none())
            .map(|field| Problem::new(field.id.as_str(), format!("Missing required field: {}", field.id)))
            .collect()
    }
}

/// Reports supplied scalar values that do not match the field mask.
pub struct MaskCheck;

impl Check for MaskCheck {
    fn check(&self, schema: &Schema, record: &CanonicalRecord, _policy: &dyn KeyPolicy) -> Vec<Problem> {
        let mut problems = Vec::new();

        for field in schema.fields.values() {
            let (Some(mask), Some(value)) = (&field.mask, record.supplied(&field.id)) else {
                continue;
            };
            let Some(text) = stringify(value) else {
                continue;
            };
            if !mask.is_match(&text) {
                problems.push(Problem::new(
                    field.id.as_str(),
                    format!("\"{}\" does not match the expected format for {}", text, field.id),
                ));
            }
        }

        problems
    }
}

/// Reports supplied values whose type is not in the field's union.
pub struct TypeCheck;

impl Check for TypeCheck {
    fn check(&self, schema: &Schema, record: &CanonicalRecord, policy: &dyn KeyPolicy) -> Vec<Problem> {
        let mut problems = Vec::new();

        for field in schema.fields.values() {
            let Some(value) = record.supplied(&field.id) else {
                continue;
            };
            if !field.accepts_type(value, |class, v| policy.satisfies_class(class, v)) {
                problems.push(type_problem(field, value));
            }
        }

        problems
    }
}

fn type_problem(field: &FieldSchema, value: &Value) -> Problem {
    Problem::new(
        field.id.as_str(),
        format!(
            "{} must be of type {}, got {}",
            field.id,
            union_name(&field.types),
            TypeTag::describe(value)
        ),
    )
}

/// Text a mask is tested against; `None` for values that are not masked.
fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        // `3.0` is masked as `3`
        Value::Number(n) => Some(match n.as_f64() {
            Some(f) if n.is_f64() => f.to_string(),
            _ => n.to_string(),
        }),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Validation configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationConfig {
    /// Append the JSON of the input record to every message.
    pub include_context: bool,
}

/// Runs every check and orders the problems for reporting.
pub struct Validator {
    config: ValidationConfig,
    checks: Vec<Box<dyn Check + Send + Sync>>,
}

impl Validator {
    /// Create a validator with default configuration.
    pub fn new() -> Self {
        Self::with_config(ValidationConfig::default())
    }

    /// Create a validator with custom configuration.
    pub fn with_config(config: ValidationConfig) -> Self {
        Self {
            config,
            checks: vec![
                Box::new(UnknownKeyCheck),
                Box::new(RequiredCheck),
                Box::new(MaskCheck),
                Box::new(TypeCheck),
            ],
        }
    }

    /// Validate a record.
    ///
    /// Unknown keys are reported first, in input order, followed by schema
    /// fields in declaration order.
    pub fn validate(&self, schema: &Schema, record: &CanonicalRecord, policy: &dyn KeyPolicy) -> Problems {
        let found: Vec<Problem> = self
            .checks
            .iter()
            .flat_map(|check| check.check(schema, record, policy))
            .collect();

        let suffix = if self.config.include_context {
            let context = serde_json::to_string(record.input()).unwrap_or_default();
            format!(" in {}", context)
        } else {
            String::new()
        };

        let order = record
            .unknown_keys()
            .iter()
            .map(String::as_str)
            .chain(schema.masters());

        let mut problems = Problems::new();
        for field in order {
            for problem in found.iter().filter(|p| p.field == field) {
                problems.push(field, format!("{}{}", problem.message, suffix));
            }
        }

        debug!(
            dataset = %schema.name,
            fields = problems.len(),
            messages = problems.message_count(),
            "Validated record"
        );

        problems
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
