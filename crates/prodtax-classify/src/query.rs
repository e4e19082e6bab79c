//! Query-time classification and retrieval filter construction.
//!
//! A query is mapped to one of three retrieval tiers:
//!
//! | Tier | Signal | Filter |
//! |------|--------|--------|
//! | `Model` | model token found | `model_number = M OR (specificity = category_common AND product_category = C)` |
//! | `Category` | category named, no model | `product_category = C OR specificity = general` |
//! | `Broad` | nothing | `specificity IN (general, category_common)` |
//!
//! An exact-model query sees that model's own documents plus category-wide
//! material, never another model's manual. Unanchored queries prefer broadly
//! applicable documents over any single product's manual.

use prodtax_core::{DocumentSpecificity, FilterExpression, MetadataField, ProductCategory, Taxonomy};
use serde::Serialize;
use tracing::{debug, instrument};

/// Model signal extracted from a query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct QueryModel {
    /// Matched token from the uppercased query.
    pub model_number: Option<String>,
    pub category: Option<ProductCategory>,
}

/// Retrieval tier chosen for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalTier {
    Model,
    Category,
    Broad,
    /// Empty query: no filter at all.
    Unfiltered,
}

impl RetrievalTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Category => "category",
            Self::Broad => "broad",
            Self::Unfiltered => "unfiltered",
        }
    }
}

impl std::fmt::Display for RetrievalTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything derived from one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryAnalysis {
    pub model_number: Option<String>,
    pub category: Option<ProductCategory>,
    pub tier: RetrievalTier,
    pub filter: Option<FilterExpression>,
}

/// Classifies queries against a borrowed [`Taxonomy`].
#[derive(Debug, Clone, Copy)]
pub struct QueryClassifier<'t> {
    taxonomy: &'t Taxonomy,
}

impl Default for QueryClassifier<'static> {
    fn default() -> Self {
        Self::new(Taxonomy::shared())
    }
}

impl<'t> QueryClassifier<'t> {
    pub fn new(taxonomy: &'t Taxonomy) -> Self {
        Self { taxonomy }
    }

    /// First model token in the uppercased query, tested category by category
    /// in taxonomy order. The first category with any match wins, regardless
    /// of match length or position.
    pub fn extract_model_from_query(&self, query: &str) -> QueryModel {
        let upper = query.to_uppercase();

        self.taxonomy
            .patterns()
            .find_map(|pattern| {
                pattern.find_first(&upper).map(|token| QueryModel {
                    model_number: Some(token.to_string()),
                    category: Some(pattern.category()),
                })
            })
            .unwrap_or_default()
    }

    /// Category named by keyword in a query that carries no model token.
    pub fn detect_query_category(&self, query: &str) -> Option<ProductCategory> {
        self.taxonomy
            .categories()
            .iter()
            .find(|rules| rules.is_named_in_query(query))
            .map(|rules| rules.category())
    }

    /// Extract the query signal, pick the tier, and build its filter.
    #[instrument(skip_all, fields(
        subsystem = "query",
        component = "query_classifier",
        op = "analyze",
        query = %query,
    ))]
    pub fn analyze(&self, query: &str) -> QueryAnalysis {
        if query.trim().is_empty() {
            debug!(tier = "unfiltered", "Empty query");
            return QueryAnalysis {
                model_number: None,
                category: None,
                tier: RetrievalTier::Unfiltered,
                filter: None,
            };
        }

        let analysis = match self.extract_model_from_query(query) {
            QueryModel {
                model_number: Some(model),
                category: Some(category),
            } => QueryAnalysis {
                filter: Some(model_filter(&model, category)),
                model_number: Some(model),
                category: Some(category),
                tier: RetrievalTier::Model,
            },
            _ => match self.detect_query_category(query) {
                Some(category) => QueryAnalysis {
                    model_number: None,
                    category: Some(category),
                    tier: RetrievalTier::Category,
                    filter: Some(category_filter(category)),
                },
                None => QueryAnalysis {
                    model_number: None,
                    category: None,
                    tier: RetrievalTier::Broad,
                    filter: Some(broad_filter()),
                },
            },
        };

        let fields = analysis
            .filter
            .as_ref()
            .map(|f| {
                f.fields()
                    .iter()
                    .map(|field| field.as_str())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .unwrap_or_default();
        debug!(
            tier = %analysis.tier,
            category = analysis.category.map(|c| c.as_str()).unwrap_or("none"),
            model_number = analysis.model_number.as_deref().unwrap_or("none"),
            fields = %fields,
            "Search filter built"
        );
        analysis
    }

    /// Retrieval pre-filter for `query`; `None` only for an empty query.
    pub fn build_search_filter(&self, query: &str) -> Option<FilterExpression> {
        self.analyze(query).filter
    }
}

fn model_filter(model_number: &str, category: ProductCategory) -> FilterExpression {
    FilterExpression::or(vec![
        FilterExpression::eq(MetadataField::ModelNumber, model_number),
        FilterExpression::and(vec![
            FilterExpression::eq(
                MetadataField::Specificity,
                DocumentSpecificity::CategoryCommon.as_str(),
            ),
            FilterExpression::eq(MetadataField::ProductCategory, category.as_str()),
        ]),
    ])
}

fn category_filter(category: ProductCategory) -> FilterExpression {
    FilterExpression::or(vec![
        FilterExpression::eq(MetadataField::ProductCategory, category.as_str()),
        FilterExpression::eq(
            MetadataField::Specificity,
            DocumentSpecificity::General.as_str(),
        ),
    ])
}

fn broad_filter() -> FilterExpression {
    FilterExpression::one_of(
        MetadataField::Specificity,
        [
            DocumentSpecificity::General.as_str(),
            DocumentSpecificity::CategoryCommon.as_str(),
        ],
    )
}
