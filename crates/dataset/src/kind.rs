//! The definition side of a dataset: what a concrete kind declares.

use std::marker::PhantomData;

use serde_json::Value;

use crate::record::KeyPolicy;
use crate::schema::SchemaSource;

/// A concrete dataset kind.
///
/// Implementors are usually unit structs; the schema returned by
/// [`DatasetKind::schema_source`] is compiled once per process.
///
/// ```
/// use dataset::{Dataset, DatasetKind, FieldDeclarations, SchemaSource};
/// use serde_json::json;
///
/// struct Song;
///
/// impl DatasetKind for Song {
///     const NAME: &'static str = "Song";
///
///     fn schema_source() -> SchemaSource {
///         FieldDeclarations::new(["title:name", "year"])
///             .require(["title"])
///             .types("year", "int")
///             .into()
///     }
/// }
///
/// let song = Dataset::<Song>::new(json!({"name": "Blue", "year": 1971})).unwrap();
/// assert_eq!(song.value("title").unwrap(), "Blue");
/// assert!(song.is_valid());
/// ```
pub trait DatasetKind: 'static {
    /// Name used in messages.
    const NAME: &'static str;

    /// The field definition.
    fn schema_source() -> SchemaSource;

    /// Keys outside the schema to carry through untouched.
    fn ignore_key(_key: &str) -> bool {
        false
    }

    /// Example records, addressable by index.
    fn examples() -> Vec<Value> {
        Vec::new()
    }

    /// Whether `value` satisfies the class tag `class`.
    fn satisfies_class(_class: &str, value: &Value) -> bool {
        value.is_object()
    }
}

/// Adapts a kind's static hooks to [`KeyPolicy`].
pub(crate) struct KindPolicy<K>(PhantomData<fn() -> K>);

impl<K> KindPolicy<K> {
    pub(crate) fn new() -> Self {
        Self(PhantomData)
    }
}

impl<K: DatasetKind> KeyPolicy for KindPolicy<K> {
    fn ignore_key(&self, key: &str) -> bool {
        K::ignore_key(key)
    }

    fn satisfies_class(&self, class: &str, value: &Value) -> bool {
        K::satisfies_class(class, value)
    }
}
