//! # prodtax-classify
//!
//! Deterministic taxonomy classifiers for a retrieval-augmented-generation
//! pipeline.
//!
//! This crate provides:
//! - Document classification at ingestion time (category, model, power
//!   type, specificity)
//! - Query classification and retrieval filter construction at query time
//!
//! Both classifiers borrow an immutable [`Taxonomy`]. The free functions
//! below bind to [`Taxonomy::shared`], the compiled-in vocabulary.
//!
//! ## Example
//!
//! ```
//! use prodtax_classify::{build_search_filter, classify_document};
//! use prodtax_classify::{DocumentSpecificity, PowerType, ProductCategory};
//!
//! let tags = classify_document(
//!     "TM-850-manual.pdf",
//!     "/docs/robot-collection/TM-850-manual.pdf",
//!     "Charge the Li-ion battery before first use.",
//!     "robot-collection",
//! );
//! assert_eq!(tags.product_category, Some(ProductCategory::Robot));
//! assert_eq!(tags.power_type, PowerType::Battery);
//! assert_eq!(tags.specificity, DocumentSpecificity::ProductSpecific);
//!
//! let filter = build_search_filter("TM-850 blade replacement").unwrap();
//! assert!(filter.matches(&tags.to_metadata()));
//! ```

pub mod document;
pub mod query;

// Re-export core types
pub use prodtax_core::*;

pub use document::{extract_model_series, DocumentClassifier, SpecificityReason};
pub use query::{QueryAnalysis, QueryClassifier, QueryModel, RetrievalTier};

/// Classify a document against the built-in taxonomy.
pub fn classify_document(
    filename: &str,
    file_path: &str,
    content: &str,
    collection_name: &str,
) -> DocumentTags {
    DocumentClassifier::default().classify(filename, file_path, content, collection_name)
}

/// Detect a document's product category with the built-in taxonomy.
pub fn detect_product_category(
    filename: &str,
    file_path: &str,
    content: &str,
) -> Option<ProductCategory> {
    DocumentClassifier::default().detect_product_category(filename, file_path, content)
}

/// Extract model numbers of `category` with the built-in taxonomy.
pub fn extract_model_numbers(text: &str, category: Option<ProductCategory>) -> Vec<String> {
    DocumentClassifier::default().extract_model_numbers(text, category)
}

/// Infer the power type with the built-in taxonomy.
pub fn detect_power_type(
    content: &str,
    model_number: Option<&str>,
    category: Option<ProductCategory>,
) -> PowerType {
    DocumentClassifier::default().detect_power_type(content, model_number, category)
}

/// Decide document specificity with the built-in taxonomy.
pub fn detect_specificity(
    model_numbers: &[String],
    category: Option<ProductCategory>,
    filename: &str,
) -> DocumentSpecificity {
    DocumentClassifier::default().detect_specificity(model_numbers, category, filename)
}

/// Extract a query's model signal with the built-in taxonomy.
pub fn extract_model_from_query(query: &str) -> QueryModel {
    QueryClassifier::default().extract_model_from_query(query)
}

/// Build the retrieval pre-filter for `query` with the built-in taxonomy.
pub fn build_search_filter(query: &str) -> Option<FilterExpression> {
    QueryClassifier::default().build_search_filter(query)
}
