//! # prodtax-core
//!
//! Core types for the prodtax document taxonomy.
//!
//! This crate holds the closed domain vocabulary, the ordered model-number
//! patterns, the per-document classification record with its scalar metadata
//! form, and the filter expressions handed to a vector store. The classifiers
//! themselves live in `prodtax-classify`.

pub mod defaults;
pub mod error;
pub mod filter;
pub mod logging;
pub mod models;
pub mod taxonomy;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use filter::FilterExpression;
pub use models::{
    DocumentMetadata, DocumentSpecificity, DocumentTags, MetadataField, PowerType,
    ProductCategory, APPLICABLE_MODELS_KEY, TAGS_KEY,
};
pub use taxonomy::{CategoryRules, CategorySpec, ModelPattern, Taxonomy, TaxonomyBuilder};
