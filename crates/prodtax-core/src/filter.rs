//! Retrieval filter expressions over scalar document metadata.
//!
//! A [`FilterExpression`] is a small boolean tree of equality and membership
//! predicates. It is handed to the vector store as a pre-filter: it restricts
//! the candidate set before similarity ranking and never re-ranks.
//!
//! The store translates the tree into its own syntax;
//! [`FilterExpression::to_vector_store_json`] emits the `$and` / `$or` /
//! `$eq` / `$in` dialect used by Chroma-style stores, and
//! [`FilterExpression::matches`] is the reference evaluator used by tests and
//! in-memory stores.
//!
//! # Example
//!
//! ```
//! use prodtax_core::{DocumentMetadata, FilterExpression, MetadataField};
//!
//! let filter = FilterExpression::or(vec![
//!     FilterExpression::eq(MetadataField::ModelNumber, "DTT-2100"),
//!     FilterExpression::and(vec![
//!         FilterExpression::eq(MetadataField::Specificity, "category_common"),
//!         FilterExpression::eq(MetadataField::ProductCategory, "ope"),
//!     ]),
//! ]);
//!
//! let mut doc = DocumentMetadata::new();
//! doc.insert(MetadataField::ModelNumber, "DTT-2100");
//! assert!(filter.matches(&doc));
//! assert_eq!(
//!     filter.to_string(),
//!     r#"model_number = "DTT-2100" OR (specificity = "category_common" AND product_category = "ope")"#
//! );
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::models::{DocumentMetadata, MetadataField};

/// Boolean predicate over document metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterExpression {
    /// `field == value`
    Eq { field: MetadataField, value: String },

    /// `field IN values`
    In {
        field: MetadataField,
        values: Vec<String>,
    },

    /// All children hold. An empty `And` matches everything.
    And(Vec<FilterExpression>),

    /// Any child holds. An empty `Or` matches nothing.
    Or(Vec<FilterExpression>),
}

impl FilterExpression {
    pub fn eq(field: MetadataField, value: impl Into<String>) -> Self {
        Self::Eq {
            field,
            value: value.into(),
        }
    }

    pub fn one_of(
        field: MetadataField,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::In {
            field,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn and(children: Vec<FilterExpression>) -> Self {
        Self::And(children)
    }

    pub fn or(children: Vec<FilterExpression>) -> Self {
        Self::Or(children)
    }

    /// Evaluate against flattened metadata. A missing field never matches.
    pub fn matches(&self, metadata: &DocumentMetadata) -> bool {
        match self {
            Self::Eq { field, value } => metadata.get_str(*field) == Some(value.as_str()),
            Self::In { field, values } => metadata
                .get_str(*field)
                .map(|actual| values.iter().any(|v| v == actual))
                .unwrap_or(false),
            Self::And(children) => children.iter().all(|c| c.matches(metadata)),
            Self::Or(children) => children.iter().any(|c| c.matches(metadata)),
        }
    }

    /// Every field the expression reads, in first-seen order.
    pub fn fields(&self) -> Vec<MetadataField> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields(&self, out: &mut Vec<MetadataField>) {
        match self {
            Self::Eq { field, .. } | Self::In { field, .. } => {
                if !out.contains(field) {
                    out.push(*field);
                }
            }
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.collect_fields(out);
                }
            }
        }
    }

    /// Translate into the `$and` / `$or` / `$eq` / `$in` operator dialect.
    ///
    /// Single-child groups collapse to the child, since those stores reject
    /// `$and` / `$or` with fewer than two entries. An empty `And` becomes the
    /// empty (match-all) object.
    pub fn to_vector_store_json(&self) -> JsonValue {
        match self {
            Self::Eq { field, value } => json!({ field.as_str(): { "$eq": value } }),
            Self::In { field, values } => json!({ field.as_str(): { "$in": values } }),
            Self::And(children) => group_json("$and", children, json!({})),
            Self::Or(children) => group_json("$or", children, json!({ "$or": [] })),
        }
    }

    fn is_group(&self) -> bool {
        matches!(self, Self::And(_) | Self::Or(_))
    }
}

fn group_json(op: &str, children: &[FilterExpression], empty: JsonValue) -> JsonValue {
    match children {
        [] => empty,
        [only] => only.to_vector_store_json(),
        _ => json!({
            op: children
                .iter()
                .map(FilterExpression::to_vector_store_json)
                .collect::<Vec<_>>()
        }),
    }
}

impl std::fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eq { field, value } => write!(f, "{} = {:?}", field, value),
            Self::In { field, values } => {
                let list = values
                    .iter()
                    .map(|v| format!("{:?}", v))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{} IN ({})", field, list)
            }
            Self::And(children) => write_group(f, "AND", children),
            Self::Or(children) => write_group(f, "OR", children),
        }
    }
}

fn write_group(
    f: &mut std::fmt::Formatter<'_>,
    op: &str,
    children: &[FilterExpression],
) -> std::fmt::Result {
    if children.is_empty() {
        return f.write_str(if op == "AND" { "TRUE" } else { "FALSE" });
    }
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", op)?;
        }
        if child.is_group() && children.len() > 1 {
            write!(f, "({})", child)?;
        } else {
            write!(f, "{}", child)?;
        }
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(pairs: &[(MetadataField, &str)]) -> DocumentMetadata {
        let mut metadata = DocumentMetadata::new();
        for (field, value) in pairs {
            metadata.insert(*field, *value);
        }
        metadata
    }

    #[test]
    fn test_eq_missing_field_never_matches() {
        let filter = FilterExpression::eq(MetadataField::ProductCategory, "robot");
        assert!(!filter.matches(&DocumentMetadata::new()));
    }

    #[test]
    fn test_in_membership() {
        let filter = FilterExpression::one_of(
            MetadataField::Specificity,
            ["general", "category_common"],
        );
        assert!(filter.matches(&doc(&[(MetadataField::Specificity, "general")])));
        assert!(!filter.matches(&doc(&[(
            MetadataField::Specificity,
            "product_specific"
        )])));
    }

    #[test]
    fn test_empty_groups() {
        let metadata = doc(&[(MetadataField::Specificity, "general")]);
        assert!(FilterExpression::and(vec![]).matches(&metadata));
        assert!(!FilterExpression::or(vec![]).matches(&metadata));
        assert_eq!(FilterExpression::and(vec![]).to_string(), "TRUE");
        assert_eq!(FilterExpression::and(vec![]).to_vector_store_json(), json!({}));
    }

    #[test]
    fn test_vector_store_json_nested() {
        let filter = FilterExpression::or(vec![
            FilterExpression::eq(MetadataField::ModelNumber, "TM-850"),
            FilterExpression::and(vec![
                FilterExpression::eq(MetadataField::Specificity, "category_common"),
                FilterExpression::eq(MetadataField::ProductCategory, "robot"),
            ]),
        ]);

        assert_eq!(
            filter.to_vector_store_json(),
            json!({
                "$or": [
                    { "model_number": { "$eq": "TM-850" } },
                    { "$and": [
                        { "specificity": { "$eq": "category_common" } },
                        { "product_category": { "$eq": "robot" } }
                    ]}
                ]
            })
        );
    }

    #[test]
    fn test_single_child_group_collapses() {
        let filter =
            FilterExpression::and(vec![FilterExpression::eq(MetadataField::Collection, "x")]);
        assert_eq!(
            filter.to_vector_store_json(),
            json!({ "collection": { "$eq": "x" } })
        );
        assert_eq!(filter.to_string(), r#"collection = "x""#);
    }

    #[test]
    fn test_display_in() {
        let filter = FilterExpression::one_of(
            MetadataField::Specificity,
            ["general", "category_common"],
        );
        assert_eq!(
            filter.to_string(),
            r#"specificity IN ("general", "category_common")"#
        );
    }

    #[test]
    fn test_fields_first_seen_order() {
        let filter = FilterExpression::or(vec![
            FilterExpression::eq(MetadataField::ProductCategory, "ope"),
            FilterExpression::eq(MetadataField::Specificity, "general"),
            FilterExpression::eq(MetadataField::ProductCategory, "robot"),
        ]);
        assert_eq!(
            filter.fields(),
            vec![MetadataField::ProductCategory, MetadataField::Specificity]
        );
    }

    #[test]
    fn test_serde_shape() {
        let filter = FilterExpression::eq(MetadataField::ModelNumber, "DCS-5000");
        let value = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            value,
            json!({ "eq": { "field": "model_number", "value": "DCS-5000" } })
        );
        let back: FilterExpression = serde_json::from_value(value).unwrap();
        assert_eq!(back, filter);
    }
}
