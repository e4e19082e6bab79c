//! Error types for prodtax.
//!
//! Classification itself never fails. These errors only surface at the
//! fallible edges: building a taxonomy, parsing wire strings, and I/O in the
//! binary.

use thiserror::Error;

use crate::models::ProductCategory;

/// Result type alias using prodtax's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for prodtax operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A model-number pattern failed to compile
    #[error("Invalid pattern for category {category}: {source}")]
    InvalidPattern {
        category: ProductCategory,
        #[source]
        source: regex::Error,
    },

    /// Taxonomy configuration is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input (unknown enum value, unknown metadata field)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
