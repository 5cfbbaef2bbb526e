//! Dataset: schema-driven data records.
//!
//! A dataset kind declares its fields once: accepted keys with aliases
//! (`"mi:me:moi"` makes `me` and `moi` alternate names for `mi`), required
//! keys, defaults, regex masks and type unions. The declaration is compiled
//! into a [`Schema`] the first time the kind is used and cached for the
//! lifetime of the process.
//!
//! # Core Principles
//!
//! - **Aliases are interchangeable on input**: every name resolves to one
//!   master key, and exports keep the name the caller used.
//! - **Records are immutable**: [`Dataset::mutate`] returns a new record.
//! - **Problems are data**: validation collects messages per field and only
//!   [`Dataset::throw_first_problem`] turns one into an error.
//!
//! # Example
//!
//! ```
//! use dataset::{Dataset, DatasetKind, FieldDeclarations, SchemaSource};
//! use serde_json::json;
//!
//! struct Solfege;
//!
//! impl DatasetKind for Solfege {
//!     const NAME: &'static str = "Solfege";
//!
//!     fn schema_source() -> SchemaSource {
//!         FieldDeclarations::new(["do", "re", "mi:me:moi"])
//!             .require(["re"])
//!             .default_value("mi", "myself")
//!             .into()
//!     }
//! }
//!
//! let ds = Dataset::<Solfege>::new(json!({"do": "bread", "me": "Aaron"})).unwrap();
//! assert_eq!(ds.get_no_alias()["mi"], "Aaron");
//! assert_eq!(ds.problems().get("re").unwrap(), ["Missing required field: re"]);
//! ```

pub mod alias;
pub mod error;
pub mod patterns;
pub mod record;
pub mod registry;
pub mod schema;
pub mod validation;

mod dataset;
mod kind;
mod markdown;

pub use crate::dataset::Dataset;
pub use alias::AliasResolver;
pub use error::{DatasetError, Result};
pub use kind::DatasetKind;
pub use record::{CanonicalRecord, KeyPolicy, StrictPolicy, is_numeric_key};
pub use registry::SchemaRegistry;
pub use schema::{FieldDeclarations, FieldSchema, Schema, SchemaCompiler, SchemaSource, TypeTag};
pub use validation::{Problem, Problems, ValidationConfig, Validator};
