//! Imported records: the input snapshot and its canonical form.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::schema::Schema;

/// Per-kind decisions about keys and class tags.
pub trait KeyPolicy {
    /// Keys outside the schema that are carried through untouched.
    fn ignore_key(&self, _key: &str) -> bool {
        false
    }

    /// Whether `value` satisfies the class tag `class`.
    fn satisfies_class(&self, _class: &str, value: &Value) -> bool {
        value.is_object()
    }
}

/// Accepts only schema keys and treats any object as any class.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictPolicy;

impl KeyPolicy for StrictPolicy {}

/// True for keys that read as numbers, e.g. list positions.
pub fn is_numeric_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key.parse::<f64>().is_ok_and(f64::is_finite)
}

/// An input record sorted against a schema.
///
/// Keeps the input exactly as supplied next to the canonical values keyed
/// by master. When several names of one group are supplied, the last one in
/// input order wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalRecord {
    input: Map<String, Value>,
    values: IndexMap<String, Value>,
    used_keys: IndexMap<String, String>,
    passthrough: Map<String, Value>,
    unknown: Vec<String>,
}

impl CanonicalRecord {
    /// Sort `input` into schema values, passthrough entries and unknown keys.
    pub fn import(schema: &Schema, input: Map<String, Value>, policy: &dyn KeyPolicy) -> Self {
        let mut values = IndexMap::new();
        let mut used_keys = IndexMap::new();
        let mut passthrough = Map::new();
        let mut unknown = Vec::new();

        for (key, value) in &input {
            if let Some(master) = schema.resolver().master_of(key) {
                values.insert(master.to_string(), value.clone());
                used_keys.insert(master.to_string(), key.clone());
            } else if schema.additional_properties || policy.ignore_key(key) {
                passthrough.insert(key.clone(), value.clone());
            } else {
                unknown.push(key.clone());
            }
        }

        Self {
            input,
            values,
            used_keys,
            passthrough,
            unknown,
        }
    }

    /// The record as supplied.
    pub fn input(&self) -> &Map<String, Value> {
        &self.input
    }

    /// The supplied value for a master, if any name of its group was used.
    pub fn supplied(&self, master: &str) -> Option<&Value> {
        self.values.get(master)
    }

    /// The name a master was supplied under.
    pub fn used_key(&self, master: &str) -> Option<&str> {
        self.used_keys.get(master).map(String::as_str)
    }

    /// Ignored keys carried through untouched, in input order.
    pub fn passthrough(&self) -> &Map<String, Value> {
        &self.passthrough
    }

    /// Keys that are neither accepted nor ignorable, in input order.
    pub fn unknown_keys(&self) -> &[String] {
        &self.unknown
    }

    /// Export in schema order with defaults for absent masters.
    ///
    /// With `use_aliases`, a field supplied under an alias is exported under
    /// that alias. Passthrough entries follow the schema fields.
    pub fn export(&self, schema: &Schema, use_aliases: bool) -> Map<String, Value> {
        let mut out = Map::new();

        for (master, field) in &schema.fields {
            let key = match self.used_key(master) {
                Some(used) if use_aliases => used.to_string(),
                _ => master.clone(),
            };
            let value = self.supplied(master).unwrap_or(&field.default).clone();
            out.insert(key, value);
        }

        for (key, value) in &self.passthrough {
            out.insert(key.clone(), value.clone());
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDeclarations, SchemaCompiler};
    use serde_json::json;

    struct NumericKeys;

    impl KeyPolicy for NumericKeys {
        fn ignore_key(&self, key: &str) -> bool {
            is_numeric_key(key)
        }
    }

    fn schema() -> Schema {
        let decl = FieldDeclarations::new(["do", "re", "mi:me:moi"]).default_value("mi", "myself");
        SchemaCompiler::new("Solfege").compile(&decl).unwrap()
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_numeric_keys() {
        assert!(is_numeric_key("0"));
        assert!(is_numeric_key("12"));
        assert!(is_numeric_key("1.5"));
        assert!(!is_numeric_key("#re"));
        assert!(!is_numeric_key(""));
        assert!(!is_numeric_key("NaN"));
    }

    #[test]
    fn test_alias_collapses_to_master() {
        let schema = schema();
        let record = CanonicalRecord::import(&schema, object(json!({"me": "Aaron"})), &StrictPolicy);
        assert_eq!(record.supplied("mi"), Some(&json!("Aaron")));
        assert_eq!(record.used_key("mi"), Some("me"));
    }

    #[test]
    fn test_last_supplied_name_wins() {
        let schema = schema();
        let record = CanonicalRecord::import(
            &schema,
            object(json!({"mi": "first", "moi": "second"})),
            &StrictPolicy,
        );
        assert_eq!(record.supplied("mi"), Some(&json!("second")));
        assert_eq!(record.used_key("mi"), Some("moi"));
    }

    #[test]
    fn test_unknown_and_passthrough_keys() {
        let schema = schema();
        let input = object(json!({"do": 1, "0": [], "foo": "bar"}));

        let strict = CanonicalRecord::import(&schema, input.clone(), &StrictPolicy);
        assert_eq!(strict.unknown_keys(), ["0", "foo"]);
        assert!(strict.passthrough().is_empty());

        let numeric = CanonicalRecord::import(&schema, input, &NumericKeys);
        assert_eq!(numeric.unknown_keys(), ["foo"]);
        assert!(numeric.passthrough().contains_key("0"));
    }

    #[test]
    fn test_export_with_and_without_aliases() {
        let schema = schema();
        let record = CanonicalRecord::import(
            &schema,
            object(json!({"re": "moon", "me": "Aaron"})),
            &StrictPolicy,
        );

        assert_eq!(
            Value::Object(record.export(&schema, true)),
            json!({"do": "", "re": "moon", "me": "Aaron"})
        );
        assert_eq!(
            Value::Object(record.export(&schema, false)),
            json!({"do": "", "re": "moon", "mi": "Aaron"})
        );
    }

    #[test]
    fn test_export_order_follows_schema() {
        let schema = schema();
        let record = CanonicalRecord::import(
            &schema,
            object(json!({"mi": "x", "re": "y", "do": "z"})),
            &StrictPolicy,
        );
        let keys: Vec<_> = record.export(&schema, true).keys().cloned().collect();
        assert_eq!(keys, ["do", "re", "mi"]);
    }
}
