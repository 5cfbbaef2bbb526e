//! Validation engine for dataset records.

mod problem;
mod validators;

pub use problem::{Problem, Problems};
pub use validators::{
    Check, MaskCheck, RequiredCheck, TypeCheck, UnknownKeyCheck, ValidationConfig, Validator,
};
