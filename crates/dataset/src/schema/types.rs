//! Type tags and value masks for field schemas.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Accepted runtime type of a field value.
///
/// A field accepts a value when the value matches any one of its tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// JSON integers.
    Integer,
    /// JSON numbers with a fractional representation.
    Double,
    /// Text.
    String,
    /// JSON arrays.
    Array,
    /// JSON objects.
    Object,
    /// `null`.
    Null,
    /// `true`/`false`.
    Boolean,
    /// A named class or interface, checked by the dataset kind.
    Class(String),
}

impl TypeTag {
    /// Parse a single tag, normalizing the short spellings.
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => TypeTag::Integer,
            "float" | "double" => TypeTag::Double,
            "string" => TypeTag::String,
            "array" => TypeTag::Array,
            "object" => TypeTag::Object,
            "null" => TypeTag::Null,
            "bool" | "boolean" => TypeTag::Boolean,
            _ => TypeTag::Class(tag.trim().to_string()),
        }
    }

    /// Parse a pipe-separated union such as `double|int`.
    pub fn parse_union(union: &str) -> Vec<Self> {
        union
            .split('|')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(TypeTag::parse)
            .collect()
    }

    /// The canonical name of this tag.
    pub fn name(&self) -> &str {
        match self {
            TypeTag::Integer => "integer",
            TypeTag::Double => "double",
            TypeTag::String => "string",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
            TypeTag::Null => "null",
            TypeTag::Boolean => "boolean",
            TypeTag::Class(name) => name.as_str(),
        }
    }

    /// The value a field of this type takes when nothing else is declared.
    pub fn default_value(&self) -> Value {
        match self {
            TypeTag::Integer => Value::from(0),
            TypeTag::Double => Value::from(0.0),
            TypeTag::String => Value::String(String::new()),
            TypeTag::Array => Value::Array(Vec::new()),
            TypeTag::Object | TypeTag::Class(_) => Value::Object(Map::new()),
            TypeTag::Null => Value::Null,
            TypeTag::Boolean => Value::Bool(false),
        }
    }

    /// Check a value against a built-in tag.
    ///
    /// Class tags are delegated to `satisfies_class`.
    pub fn matches(&self, value: &Value, satisfies_class: impl Fn(&str, &Value) -> bool) -> bool {
        match self {
            TypeTag::Integer => value.is_i64() || value.is_u64(),
            TypeTag::Double => value.is_f64(),
            TypeTag::String => value.is_string(),
            TypeTag::Array => value.is_array(),
            TypeTag::Object => value.is_object(),
            TypeTag::Null => value.is_null(),
            TypeTag::Boolean => value.is_boolean(),
            TypeTag::Class(name) => satisfies_class(name, value),
        }
    }

    /// Name of the runtime type of a value, in tag vocabulary.
    pub fn describe(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(n) if n.is_f64() => "double",
            Value::Number(_) => "integer",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for TypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Join tags into their union spelling.
pub fn union_name(tags: &[TypeTag]) -> String {
    tags.iter().map(TypeTag::name).collect::<Vec<_>>().join("|")
}

/// A compiled regex a stringified value must match.
#[derive(Debug, Clone)]
pub struct Mask {
    pattern: String,
    regex: Regex,
}

impl Mask {
    /// Compile a mask.
    ///
    /// Accepts a plain pattern or a delimited one such as `/^m.+/i`.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let (body, flags) = split_delimited(pattern);
        let mut builder = RegexBuilder::new(body);
        for flag in flags.chars() {
            match flag {
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'x' => {
                    builder.ignore_whitespace(true);
                }
                _ => {}
            }
        }

        Ok(Self {
            pattern: pattern.to_string(),
            regex: builder.build()?,
        })
    }

    /// The pattern as declared.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Test a value.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Mask {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Serialize for Mask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.pattern)
    }
}

fn split_delimited(pattern: &str) -> (&str, &str) {
    if let Some(rest) = pattern.strip_prefix('/') {
        if let Some(end) = rest.rfind('/') {
            let flags = &rest[end + 1..];
            if flags.chars().all(|c| "imsxu".contains(c)) {
                return (&rest[..end], flags);
            }
        }
    }
    (pattern, "")
}
