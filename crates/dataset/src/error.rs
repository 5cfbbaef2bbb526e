//! Error types for the dataset library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for dataset operations.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The field declarations of a dataset kind are malformed.
    #[error("Configuration error in {dataset}: {message}")]
    Configuration { dataset: String, message: String },

    /// A field mask could not be compiled.
    #[error("Invalid pattern for field '{field}': {source}")]
    Pattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// A key that is neither a master, an alias, nor an ignorable key.
    #[error("\"{key}\" is not a known key in {dataset}")]
    UnknownKey { key: String, dataset: String },

    /// The first validation problem, raised on request.
    #[error("{0}")]
    Validation(String),

    /// An example index past the number of declared examples.
    #[error("Example {index} is out of range; {dataset} declares {count} example(s)")]
    ExampleOutOfRange {
        dataset: String,
        index: usize,
        count: usize,
    },

    /// Input that cannot be normalized to a record.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error reading a schema document.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DatasetError {
    pub(crate) fn config(dataset: &str, message: impl Into<String>) -> Self {
        DatasetError::Configuration {
            dataset: dataset.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn unknown_key(dataset: &str, key: &str) -> Self {
        DatasetError::UnknownKey {
            key: key.to_string(),
            dataset: dataset.to_string(),
        }
    }
}

/// Result type alias for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;
