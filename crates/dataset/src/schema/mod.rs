//! Field declarations, their compiled schema, and schema sources.

mod compiler;
mod field;
mod source;
mod types;

pub use compiler::{FieldDeclarations, SchemaCompiler};
pub use field::{FieldSchema, Schema};
pub use source::{SchemaSource, from_json_schema};
pub use types::{Mask, TypeTag, union_name};
