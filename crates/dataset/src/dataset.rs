//! The dataset façade and its public API.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{DatasetError, Result};
use crate::kind::{DatasetKind, KindPolicy};
use crate::markdown;
use crate::record::CanonicalRecord;
use crate::registry::SchemaRegistry;
use crate::schema::{Schema, TypeTag};
use crate::validation::{Problems, ValidationConfig, Validator};

/// An immutable record of kind `K`.
///
/// Every key supplied on input is resolved through the kind's schema:
/// aliases collapse onto their master, ignorable keys pass through, and
/// anything else is reported by [`Dataset::problems`]. Updates go through
/// [`Dataset::mutate`], which returns a new record.
pub struct Dataset<K: DatasetKind> {
    schema: Arc<Schema>,
    record: CanonicalRecord,
    with_context: bool,
    problems: OnceCell<Problems>,
    kind: PhantomData<fn() -> K>,
}

impl<K: DatasetKind> Dataset<K> {
    /// Create a record from an object, a JSON string, or `null`.
    pub fn new(input: Value) -> Result<Self> {
        match input {
            Value::Object(map) => Self::from_map(map),
            Value::String(text) => Self::from_json(&text),
            Value::Null => Self::empty(),
            other => Err(DatasetError::InvalidInput(format!(
                "{} expects an object, got {}",
                K::NAME,
                TypeTag::describe(&other)
            ))),
        }
    }

    /// Create a record from an object map.
    pub fn from_map(input: Map<String, Value>) -> Result<Self> {
        let schema = Self::schema()?;
        let record = CanonicalRecord::import(&schema, input, &KindPolicy::<K>::new());
        Ok(Self {
            schema,
            record,
            with_context: false,
            problems: OnceCell::new(),
            kind: PhantomData,
        })
    }

    /// Create a record from JSON text holding an object.
    pub fn from_json(text: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => Self::from_map(map),
            other => Err(DatasetError::InvalidInput(format!(
                "{} expects a JSON object, got {}",
                K::NAME,
                TypeTag::describe(&other)
            ))),
        }
    }

    /// Create a record from anything that serializes to an object.
    pub fn from_serializable<T: Serialize + ?Sized>(input: &T) -> Result<Self> {
        match serde_json::to_value(input)? {
            Value::Object(map) => Self::from_map(map),
            other => Err(DatasetError::InvalidInput(format!(
                "{} expects an object, got {}",
                K::NAME,
                TypeTag::describe(&other)
            ))),
        }
    }

    /// A record with nothing supplied.
    pub fn empty() -> Result<Self> {
        Self::from_map(Map::new())
    }

    /// The declared example at `index`.
    pub fn example(index: usize) -> Result<Self> {
        let mut examples = K::examples();
        if index >= examples.len() {
            return Err(DatasetError::ExampleOutOfRange {
                dataset: K::NAME.to_string(),
                index,
                count: examples.len(),
            });
        }
        Self::new(examples.swap_remove(index))
    }

    /// A new record of the same kind built from `input`.
    pub fn import(&self, input: Value) -> Result<Self> {
        Self::new(input)
    }

    /// The compiled schema of this kind.
    pub fn schema() -> Result<Arc<Schema>> {
        SchemaRegistry::global().schema::<K>()
    }

    /// Default value of a field, by master or alias.
    pub fn get_default(name: &str) -> Result<Value> {
        Ok(Self::schema()?.require_field(name)?.default.clone())
    }

    /// Every master with its default, in schema order.
    pub fn defaults() -> Result<Map<String, Value>> {
        Ok(Self::schema()?.defaults())
    }

    /// Name of this kind.
    pub fn name(&self) -> &'static str {
        K::NAME
    }

    /// The input exactly as supplied.
    pub fn input(&self) -> &Map<String, Value> {
        self.record.input()
    }

    /// The record in schema order with defaults filled in.
    ///
    /// A field supplied under an alias is exported under that alias.
    /// Ignored keys follow the schema fields; unknown keys are left out.
    pub fn get(&self) -> Map<String, Value> {
        self.record.export(&self.schema, true)
    }

    /// Like [`Dataset::get`] but every field keyed by its master.
    pub fn get_no_alias(&self) -> Map<String, Value> {
        self.record.export(&self.schema, false)
    }

    /// Value of a field by master or alias, or of an ignored key.
    pub fn value(&self, name: &str) -> Result<&Value> {
        if let Some(field) = self.schema.field(name) {
            return Ok(self.record.supplied(&field.id).unwrap_or(&field.default));
        }
        self.record
            .passthrough()
            .get(name)
            .ok_or_else(|| DatasetError::unknown_key(K::NAME, name))
    }

    /// A new record with one field replaced.
    ///
    /// The field keeps the name it was supplied under; a field not yet
    /// supplied is added under `name`.
    pub fn mutate(&self, name: &str, value: impl Into<Value>) -> Result<Self> {
        let key = match self.schema.resolver().master_of(name) {
            Some(master) => self.record.used_key(master).unwrap_or(name).to_string(),
            None if self.schema.additional_properties || K::ignore_key(name) => name.to_string(),
            None => return Err(DatasetError::unknown_key(K::NAME, name)),
        };

        let mut input = self.record.input().clone();
        input.insert(key, value.into());

        let record = CanonicalRecord::import(&self.schema, input, &KindPolicy::<K>::new());
        Ok(Self {
            schema: Arc::clone(&self.schema),
            record,
            with_context: self.with_context,
            problems: OnceCell::new(),
            kind: PhantomData,
        })
    }

    /// Validate now and keep the result.
    pub fn validate(&self) -> &Self {
        self.problems();
        self
    }

    /// Problems by field; empty when the record is valid.
    pub fn problems(&self) -> &Problems {
        self.problems.get_or_init(|| {
            let validator = Validator::with_config(ValidationConfig {
                include_context: self.with_context,
            });
            validator.validate(&self.schema, &self.record, &KindPolicy::<K>::new())
        })
    }

    /// True when there are no problems.
    pub fn is_valid(&self) -> bool {
        self.problems().is_empty()
    }

    /// Fail with the first problem, or hand back this record.
    pub fn throw_first_problem(&self) -> Result<&Self> {
        match self.problems().first() {
            Some((_, message)) => Err(DatasetError::Validation(message.to_string())),
            None => Ok(self),
        }
    }

    /// A copy whose problem messages carry the input as JSON.
    pub fn with_context(&self) -> Self {
        self.copy_with_context(true)
    }

    /// A copy without context in its messages.
    pub fn without_context(&self) -> Self {
        self.copy_with_context(false)
    }

    fn copy_with_context(&self, with_context: bool) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            record: self.record.clone(),
            with_context,
            problems: OnceCell::new(),
            kind: PhantomData,
        }
    }

    /// JSON object of [`Dataset::get`].
    pub fn to_json(&self) -> String {
        Value::Object(self.get()).to_string()
    }

    /// Markdown summary of this kind's schema.
    pub fn markdown(&self) -> String {
        markdown::render(&self.schema)
    }
}

impl<K: DatasetKind> Clone for Dataset<K> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            record: self.record.clone(),
            with_context: self.with_context,
            problems: self.problems.clone(),
            kind: PhantomData,
        }
    }
}

impl<K: DatasetKind> fmt::Debug for Dataset<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dataset")
            .field("kind", &K::NAME)
            .field("input", self.record.input())
            .field("with_context", &self.with_context)
            .finish()
    }
}

impl<K: DatasetKind> fmt::Display for Dataset<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

impl<K: DatasetKind> Serialize for Dataset<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.get().serialize(serializer)
    }
}

impl<K: DatasetKind> TryFrom<Value> for Dataset<K> {
    type Error = DatasetError;

    fn try_from(input: Value) -> Result<Self> {
        Self::new(input)
    }
}

impl<K: DatasetKind> std::str::FromStr for Dataset<K> {
    type Err = DatasetError;

    fn from_str(text: &str) -> Result<Self> {
        Self::from_json(text)
    }
}
