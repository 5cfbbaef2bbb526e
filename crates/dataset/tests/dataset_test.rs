//! Integration tests for dataset records.

use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};

use dataset::patterns::REGEX_DATE_ISO8601;
use dataset::{
    Dataset, DatasetError, DatasetKind, FieldDeclarations, SchemaSource, TypeTag, is_numeric_key,
};

// =============================================================================
// Test Kinds
// =============================================================================

/// Aliased fields, masks, a union type and a computed default.
struct Alpha;

impl DatasetKind for Alpha {
    const NAME: &'static str = "Alpha";

    fn schema_source() -> SchemaSource {
        FieldDeclarations::new(["do", "re", "mi:me:moi", "pi", "fo", "list", "date", "boolean"])
            .require(["re"])
            .default_value("do", "deer")
            .default_value("re", "sun")
            .default_value("mi", "myself")
            .default_value("pi", 3.14)
            .default_value("list", json!([]))
            .default_value("date", Utc::now().format("%Y-%m-%dT%H:%M:%S%z").to_string())
            .pattern("mi", "/^m.+/")
            .pattern("date", REGEX_DATE_ISO8601)
            .types("pi", "double|int")
            .types("list", "array")
            .types("boolean", "boolean")
            .describe("do", "This is the first key")
            .describe("list", "This tests how arrays fare.")
            .into()
    }

    fn examples() -> Vec<Value> {
        vec![json!({
            "do": "The first",
            "re": "The second",
            "me": "mom",
            "pi": 3.14,
            "list": ["blue", "yellow"],
        })]
    }
}

/// One field per type tag, numeric keys allowed.
struct Bravo;

impl DatasetKind for Bravo {
    const NAME: &'static str = "Bravo";

    fn schema_source() -> SchemaSource {
        FieldDeclarations::new([
            "integer",
            "double:float",
            "string",
            "array",
            "object",
            "null",
            "custom_class",
        ])
        .require(["integer"])
        .types("integer", "integer")
        .types("double", "double")
        .types("string", "string")
        .types("array", "array")
        .types("object", "object")
        .types("null", "null")
        .types("custom_class", "SomeCustomClass")
        .describe("integer", "")
        .into()
    }

    fn ignore_key(key: &str) -> bool {
        is_numeric_key(key)
    }

    fn examples() -> Vec<Value> {
        vec![json!({"integer": 34, "double": 98.6})]
    }

    fn satisfies_class(class: &str, value: &Value) -> bool {
        class == "SomeCustomClass" && value.is_object()
    }
}

/// Defined by an embedded JSON schema.
struct Versioned;

impl DatasetKind for Versioned {
    const NAME: &'static str = "Versioned";

    fn schema_source() -> SchemaSource {
        SchemaSource::JsonSchema(
            r#"{"$schema": "http://json-schema.org/draft-07/schema#","type":"object","required":["id"],"properties":{"id":{"type":"integer"},"version":{"type":"string","default":"1.2.5"}},"additionalProperties":false}"#
                .to_string(),
        )
    }
}

/// Carries keys outside its schema through.
struct Open;

impl DatasetKind for Open {
    const NAME: &'static str = "Open";

    fn schema_source() -> SchemaSource {
        SchemaSource::JsonSchema(
            r#"{"properties":{"id":{"type":"integer"}},"additionalProperties":true}"#.to_string(),
        )
    }
}

/// Same idea, declared in code.
struct OpenDeclared;

impl DatasetKind for OpenDeclared {
    const NAME: &'static str = "OpenDeclared";

    fn schema_source() -> SchemaSource {
        FieldDeclarations::new(["id:key"])
            .types("id", "int")
            .with_additional_properties(true)
            .into()
    }
}

fn without_date(mut record: serde_json::Map<String, Value>) -> Value {
    let date = record.shift_remove("date").expect("date is always exported");
    assert!(!date.as_str().unwrap_or_default().is_empty());
    Value::Object(record)
}

// =============================================================================
// Alias Resolution Tests
// =============================================================================

#[test]
fn test_get_default_same_for_every_alias() {
    for name in ["me", "mi", "moi"] {
        assert_eq!(Dataset::<Alpha>::get_default(name).unwrap(), json!("myself"));
    }
}

#[test]
fn test_get_default_with_bogus_key_fails() {
    let err = Dataset::<Alpha>::get_default("bogus").unwrap_err();
    assert!(matches!(err, DatasetError::UnknownKey { .. }));
}

#[test]
fn test_value_with_alias_returns_master_value() {
    let ds = Dataset::<Alpha>::example(0).unwrap();
    assert_eq!(ds.value("moi").unwrap(), "mom");
    assert_eq!(ds.value("me").unwrap(), "mom");
    assert_eq!(ds.value("mi").unwrap(), "mom");
}

#[test]
fn test_value_on_bogus_key_fails() {
    let ds = Dataset::<Alpha>::example(0).unwrap();
    assert!(matches!(ds.value("bogus"), Err(DatasetError::UnknownKey { .. })));
}

#[test]
fn test_resolver_agrees_for_every_alias() {
    let schema = Dataset::<Alpha>::schema().unwrap();
    let resolver = schema.resolver();
    let master = resolver.resolve_to_master("mi").unwrap();
    for alias in ["me", "moi"] {
        assert_eq!(resolver.resolve_to_master(alias).unwrap(), master);
        assert!(resolver.is_alias(alias));
    }
    assert_eq!(resolver.all_aliases_of("moi").unwrap(), ["mi", "me", "moi"]);
    assert_eq!(resolver.other_aliases_of("me").unwrap(), ["mi", "moi"]);
    assert_eq!(resolver.non_master_aliases_of("moi").unwrap(), ["me", "moi"]);
}

// =============================================================================
// Export Tests
// =============================================================================

#[test]
fn test_get_fills_defaults_without_unused_aliases() {
    let ds = Dataset::<Alpha>::new(json!({"re": "moon", "do": "bread"})).unwrap();
    assert_eq!(
        without_date(ds.get()),
        json!({
            "do": "bread",
            "re": "moon",
            "mi": "myself",
            "pi": 3.14,
            "fo": "",
            "list": [],
            "boolean": false,
        })
    );
    let keys: Vec<_> = ds.get().keys().cloned().collect();
    assert_eq!(keys, ["do", "re", "mi", "pi", "fo", "list", "date", "boolean"]);
}

#[test]
fn test_get_no_alias_collapses_alias() {
    let ds = Dataset::<Alpha>::new(json!({"re": "moon", "do": "bread", "me": "Aaron"})).unwrap();
    let record = ds.get_no_alias();
    assert!(!record.contains_key("me"));
    assert_eq!(
        without_date(record),
        json!({
            "do": "bread",
            "re": "moon",
            "mi": "Aaron",
            "pi": 3.14,
            "fo": "",
            "list": [],
            "boolean": false,
        })
    );
}

#[test]
fn test_example_uses_alias_from_input() {
    let ds = Dataset::<Alpha>::example(0).unwrap();
    assert!(ds.get().contains_key("me"));
    assert!(!ds.get().contains_key("mi"));

    let masters = ds.get_no_alias();
    assert!(!masters.contains_key("me"));
    let keys: Vec<_> = masters.keys().cloned().collect();
    assert_eq!(keys, ["do", "re", "mi", "pi", "fo", "list", "date", "boolean"]);
}

#[test]
fn test_dataset_from_own_export_is_identical() {
    let control = Dataset::<Alpha>::example(0).unwrap().get();
    let copy = Dataset::<Alpha>::from_map(control.clone()).unwrap();
    assert_eq!(copy.get(), control);
}

#[test]
fn test_json_round_trip_keeps_canonical_record() {
    let ds = Dataset::<Alpha>::new(json!({"re": "moon", "moi": "mars", "pi": 2})).unwrap();
    let copy: Dataset<Alpha> = ds.to_json().parse().unwrap();
    assert_eq!(copy.get_no_alias(), ds.get_no_alias());
}

#[test]
fn test_json_includes_defaults() {
    let ds = Dataset::<Versioned>::new(json!({"id": 5})).unwrap();
    assert_eq!(ds.to_string(), r#"{"id":5,"version":"1.2.5"}"#);
    assert!(ds.is_valid());
}

#[test]
fn test_defaults_in_schema_order() {
    let defaults = Dataset::<Alpha>::defaults().unwrap();
    assert_eq!(
        without_date(defaults),
        json!({
            "do": "deer",
            "re": "sun",
            "mi": "myself",
            "pi": 3.14,
            "fo": "",
            "list": [],
            "boolean": false,
        })
    );
}

#[test]
fn test_import_object_array_and_json() {
    let control = Dataset::<Alpha>::example(0).unwrap().get();
    let json = Value::Object(control.clone()).to_string();
    let base = Dataset::<Alpha>::empty().unwrap();

    assert_eq!(base.import(Value::Object(control.clone())).unwrap().to_json(), json);
    assert_eq!(base.import(Value::String(json.clone())).unwrap().to_json(), json);
    assert_eq!(Dataset::<Alpha>::from_serializable(&control).unwrap().to_json(), json);
}

#[derive(Serialize)]
struct Row {
    #[serde(rename = "do")]
    first: &'static str,
    re: &'static str,
    me: &'static str,
}

#[test]
fn test_import_serializable_struct() {
    let row = Row {
        first: "The first",
        re: "The second",
        me: "mom",
    };
    let ds = Dataset::<Alpha>::from_serializable(&row).unwrap();
    assert!(ds.to_json().starts_with(r#"{"do":"The first","re":"The second","me":"mom","pi":3.14"#));
    assert_eq!(ds.get_no_alias()["mi"], "mom");
}

#[test]
fn test_non_object_input_is_rejected() {
    assert!(matches!(
        Dataset::<Alpha>::from_json("[1, 2, 3]"),
        Err(DatasetError::InvalidInput(_))
    ));
    assert!(matches!(
        Dataset::<Alpha>::from_json("{oops"),
        Err(DatasetError::Json(_))
    ));
}

// =============================================================================
// Schema Tests
// =============================================================================

#[test]
fn test_schema_contains_masters_only() {
    let schema = Dataset::<Alpha>::schema().unwrap();
    assert_eq!(
        schema.masters().collect::<Vec<_>>(),
        ["do", "re", "mi", "pi", "fo", "list", "date", "boolean"]
    );

    let fields = serde_json::to_value(&schema.fields).unwrap();
    let first = fields["do"].as_object().unwrap();
    let keys: Vec<_> = first.keys().cloned().collect();
    assert_eq!(
        keys,
        ["id", "default", "master", "is_alias", "aliases", "required", "mask", "types", "description"]
    );
    assert_eq!(fields["mi"]["aliases"], json!(["me", "moi"]));
    assert_eq!(fields["mi"]["is_alias"], json!(false));
    assert_eq!(fields["re"]["required"], json!(true));
    assert_eq!(fields["pi"]["types"], json!(["double", "integer"]));
    assert_eq!(fields["do"]["description"], json!("This is the first key"));
}

#[test]
fn test_schema_is_shared_between_records() {
    let a = Dataset::<Alpha>::schema().unwrap();
    let b = Dataset::<Alpha>::schema().unwrap();
    assert!(std::sync::Arc::ptr_eq(&a, &b));
}

#[test]
fn test_bravo_defaults_by_type() {
    for (key, expected) in [
        ("integer", json!(0)),
        ("double", json!(0.0)),
        ("float", json!(0.0)),
        ("string", json!("")),
        ("array", json!([])),
        ("object", json!({})),
        ("null", Value::Null),
        ("custom_class", json!({})),
    ] {
        assert_eq!(Dataset::<Bravo>::get_default(key).unwrap(), expected, "{key}");
    }

    let schema = Dataset::<Bravo>::schema().unwrap();
    assert_eq!(
        schema.fields["custom_class"].types,
        [TypeTag::Class("SomeCustomClass".into())]
    );
}

#[test]
fn test_markdown() {
    let md = Dataset::<Alpha>::example(0).unwrap().markdown();
    assert!(md.contains("| mi | me, moi |"));
    assert!(md.contains("This is the first key"));
}

// =============================================================================
// Example Tests
// =============================================================================

#[test]
fn test_invalid_example_index_fails() {
    let err = Dataset::<Alpha>::example(99).unwrap_err();
    assert!(matches!(
        err,
        DatasetError::ExampleOutOfRange { index: 99, count: 1, .. }
    ));
}

#[test]
fn test_examples_validate() {
    assert!(Dataset::<Alpha>::example(0).unwrap().is_valid());
    assert!(Dataset::<Bravo>::example(0).unwrap().is_valid());
}

// =============================================================================
// Mutation Tests
// =============================================================================

#[test]
fn test_mutate_returns_new_record_with_new_value() {
    let ds = Dataset::<Alpha>::new(json!({"do": "re"})).unwrap();
    let changed = ds.mutate("do", "dough").unwrap();
    assert_eq!(changed.value("do").unwrap(), "dough");
    assert_eq!(ds.value("do").unwrap(), "re");
}

#[test]
fn test_mutate_same_value_twice_is_canonically_equal() {
    let ds = Dataset::<Alpha>::new(json!({"do": "re"})).unwrap();
    let once = ds.mutate("moi", "moon").unwrap();
    let twice = once.mutate("moi", "moon").unwrap();
    assert_eq!(once.get_no_alias(), twice.get_no_alias());
    assert_eq!(twice.get()["moi"], "moon");
}

#[test]
fn test_mutate_through_alias_updates_master() {
    let ds = Dataset::<Alpha>::new(json!({"mi": "mars"})).unwrap();
    let changed = ds.mutate("me", "moon").unwrap();
    assert_eq!(changed.get()["mi"], "moon");
    assert!(!changed.get().contains_key("me"));
}

#[test]
fn test_mutate_unknown_key_fails() {
    let ds = Dataset::<Alpha>::empty().unwrap();
    assert!(matches!(ds.mutate("bogus", 1), Err(DatasetError::UnknownKey { .. })));
}

// =============================================================================
// Additional Properties Tests
// =============================================================================

#[test]
fn test_additional_keys_pass_through() {
    let ds = Dataset::<Open>::new(json!({"id": 1, "extra": "x"})).unwrap();
    assert!(ds.is_valid(), "{:?}", ds.problems());
    assert_eq!(ds.to_json(), r#"{"id":1,"extra":"x"}"#);
    assert_eq!(ds.value("extra").unwrap(), "x");
}

#[test]
fn test_additional_keys_follow_schema_fields() {
    let ds = Dataset::<Open>::new(json!({"extra": "x", "id": 1})).unwrap();
    assert_eq!(ds.to_json(), r#"{"id":1,"extra":"x"}"#);
}

#[test]
fn test_mutate_additional_keys() {
    let ds = Dataset::<Open>::new(json!({"id": 1, "extra": "x"})).unwrap();

    let replaced = ds.mutate("extra", "y").unwrap();
    assert_eq!(replaced.to_json(), r#"{"id":1,"extra":"y"}"#);

    let appended = ds.mutate("other", 5).unwrap();
    assert_eq!(appended.to_json(), r#"{"id":1,"extra":"x","other":5}"#);
    assert_eq!(appended.value("other").unwrap(), 5);
    assert!(appended.is_valid());
}

#[test]
fn test_additional_keys_from_declarations() {
    let ds = Dataset::<OpenDeclared>::new(json!({"key": 7, "note": "kept"})).unwrap();
    assert!(ds.is_valid(), "{:?}", ds.problems());
    assert_eq!(ds.to_json(), r#"{"key":7,"note":"kept"}"#);
    assert_eq!(ds.get_no_alias()["id"], 7);
}

#[test]
fn test_additional_keys_still_type_check_schema_fields() {
    let ds = Dataset::<Open>::new(json!({"id": "one", "extra": "x"})).unwrap();
    assert_eq!(ds.problems().fields().collect::<Vec<_>>(), ["id"]);
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_missing_required_field_shows_one_problem() {
    let mut input = Dataset::<Alpha>::example(0).unwrap().get();
    input.shift_remove("re");
    let ds = Dataset::<Alpha>::from_map(input).unwrap();

    let problems = ds.validate().problems();
    assert_eq!(problems.get("re").unwrap(), ["Missing required field: re"]);

    let err = ds.throw_first_problem().unwrap_err();
    assert_eq!(err.to_string(), "Missing required field: re");
}

#[test]
fn test_invalid_format_shows_problem() {
    let ds = Dataset::<Alpha>::example(0).unwrap().mutate("mi", "you").unwrap();
    assert!(ds.problems().contains("mi"));
}

#[test]
fn test_wrong_type_shows_problem_and_throws() {
    let ds = Dataset::<Alpha>::example(0).unwrap().mutate("pi", "demo").unwrap();
    assert!(!ds.problems().is_empty());
    assert!(matches!(
        ds.validate().throw_first_problem(),
        Err(DatasetError::Validation(_))
    ));
}

#[test]
fn test_throw_first_problem_returns_self_when_valid() {
    let ds = Dataset::<Alpha>::example(0).unwrap();
    let returned = ds.validate().throw_first_problem().unwrap();
    assert!(std::ptr::eq(returned, &ds));
}

#[test]
fn test_unknown_key_is_reported_with_context() {
    let err = Dataset::<Bravo>::new(json!({"foo": "bar"}))
        .unwrap()
        .with_context()
        .throw_first_problem()
        .map(|_| ())
        .unwrap_err();
    assert!(err.to_string().contains("\"foo\" is not an accepted key in Bravo"));
}

#[test]
fn test_numeric_key_allowed_by_kind() {
    let ds = Dataset::<Bravo>::new(json!({"integer": 5, "0": []})).unwrap();
    let record = ds.validate().throw_first_problem().unwrap().get();
    assert!(record.contains_key("0"));
    assert!(record.contains_key("integer"));
}

#[test]
fn test_non_numeric_unknown_key_fails() {
    let ds = Dataset::<Bravo>::new(json!({"#integer": 5, "0": []})).unwrap();
    assert!(ds.validate().throw_first_problem().is_err());

    let ds = Dataset::<Alpha>::new(json!({"#re": "sun", "0": []})).unwrap();
    assert!(ds.throw_first_problem().is_err());
}

#[test]
fn test_throw_first_problem_without_input() {
    let err = Dataset::<Bravo>::empty()
        .unwrap()
        .throw_first_problem()
        .map(|_| ())
        .unwrap_err();
    assert_eq!(err.to_string(), "Missing required field: integer");
}

#[test]
fn test_context_throw_includes_input_json() {
    let ds = Dataset::<Bravo>::new(json!({"double": 9.4})).unwrap();
    let err = ds.with_context().throw_first_problem().map(|_| ()).unwrap_err();
    assert!(err.to_string().contains(r#"{"double":9.4}"#));
}

#[test]
fn test_context_applies_to_one_copy_only() {
    let ds = Dataset::<Bravo>::new(json!({"double": 9.4})).unwrap();

    let with = ds.with_context();
    let problem = &with.problems().get("integer").unwrap()[0];
    assert!(problem.starts_with("Missing required field: integer in"));

    let problem = &ds.problems().get("integer").unwrap()[0];
    assert_eq!(problem, "Missing required field: integer");
}

#[test]
fn test_custom_class_must_be_object() {
    let ds = Dataset::<Bravo>::new(json!({"integer": 1, "custom_class": "nope"})).unwrap();
    assert_eq!(
        ds.problems().get("custom_class").unwrap(),
        ["custom_class must be of type SomeCustomClass, got string"]
    );
}

#[test]
fn test_default_for_object_is_empty_object() {
    let ds = Dataset::<Bravo>::empty().unwrap();
    assert_eq!(ds.get()["object"], json!({}));
}
