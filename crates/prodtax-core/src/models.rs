//! Domain vocabulary and classification records.
//!
//! The three closed enumerations ([`ProductCategory`], [`PowerType`],
//! [`DocumentSpecificity`]) are stored on vector-store chunks as their
//! lowercase wire strings, so `Display`, `FromStr` and serde all agree on the
//! same spelling.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::defaults::{LIST_SEPARATOR, UNCATEGORIZED_TAG};
use crate::error::Error;

// =============================================================================
// ENUMS
// =============================================================================

/// Product line a document belongs to.
///
/// The declaration order is the taxonomy order used for tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    /// Robotic mowers and other autonomous machines.
    Robot,
    /// Outdoor power equipment (chainsaws, trimmers, blowers).
    Ope,
    /// ERCO tool line.
    Erco,
}

impl ProductCategory {
    /// All categories in taxonomy order.
    pub const ALL: [ProductCategory; 3] = [Self::Robot, Self::Ope, Self::Erco];

    /// Lowercase wire name stored in metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Robot => "robot",
            Self::Ope => "ope",
            Self::Erco => "erco",
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "robot" => Ok(Self::Robot),
            "ope" => Ok(Self::Ope),
            "erco" => Ok(Self::Erco),
            _ => Err(Error::InvalidInput(format!(
                "Invalid product category: {}",
                s
            ))),
        }
    }
}

/// How a product is powered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PowerType {
    Battery,
    Fuel,
    /// No signal, or battery and fuel evidence cancel out.
    #[default]
    Unknown,
}

impl PowerType {
    pub const ALL: [PowerType; 3] = [Self::Battery, Self::Fuel, Self::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Battery => "battery",
            Self::Fuel => "fuel",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PowerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PowerType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "battery" => Ok(Self::Battery),
            "fuel" => Ok(Self::Fuel),
            "unknown" => Ok(Self::Unknown),
            _ => Err(Error::InvalidInput(format!("Invalid power type: {}", s))),
        }
    }
}

/// How narrowly a document applies, ordered narrowest to broadest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSpecificity {
    /// Applies to a single model.
    ProductSpecific,
    /// Applies to a whole product category (or to several models of it).
    CategoryCommon,
    /// Cross-category domain knowledge.
    #[default]
    General,
}

impl DocumentSpecificity {
    pub const ALL: [DocumentSpecificity; 3] =
        [Self::ProductSpecific, Self::CategoryCommon, Self::General];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProductSpecific => "product_specific",
            Self::CategoryCommon => "category_common",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for DocumentSpecificity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentSpecificity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "product_specific" | "product-specific" => Ok(Self::ProductSpecific),
            "category_common" | "category-common" => Ok(Self::CategoryCommon),
            "general" => Ok(Self::General),
            _ => Err(Error::InvalidInput(format!(
                "Invalid document specificity: {}",
                s
            ))),
        }
    }
}

// =============================================================================
// DOCUMENT TAGS
// =============================================================================

/// Classification result for one ingested document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentTags {
    pub product_category: Option<ProductCategory>,

    pub power_type: PowerType,

    /// First model token found, uppercased.
    pub model_number: Option<String>,

    /// Leading alphabetic prefix of `model_number`.
    pub model_series: Option<String>,

    pub specificity: DocumentSpecificity,

    /// Every distinct model token, in first-seen order. Only set when more
    /// than one was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicable_models: Option<Vec<String>>,

    /// Flat keyword list for free-text search.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl DocumentTags {
    /// Build the free-text tag list: collection, category (or
    /// "uncategorized"), specificity, power type. Empty entries are dropped.
    pub fn build_tag_list(
        collection_name: &str,
        category: Option<ProductCategory>,
        specificity: DocumentSpecificity,
        power_type: PowerType,
    ) -> Vec<String> {
        [
            collection_name,
            category.map(|c| c.as_str()).unwrap_or(UNCATEGORIZED_TAG),
            specificity.as_str(),
            power_type.as_str(),
        ]
        .into_iter()
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
    }

    /// Every model this document covers: `applicable_models` when present,
    /// otherwise the single `model_number`.
    pub fn models(&self) -> Vec<&str> {
        match (&self.applicable_models, &self.model_number) {
            (Some(models), _) => models.iter().map(String::as_str).collect(),
            (None, Some(model)) => vec![model.as_str()],
            (None, None) => Vec::new(),
        }
    }

    /// Flatten into scalar metadata for a vector store.
    ///
    /// Absent values are dropped and list values are joined with
    /// [`LIST_SEPARATOR`].
    pub fn to_metadata(&self) -> DocumentMetadata {
        let mut metadata = DocumentMetadata::new();

        if let Some(category) = self.product_category {
            metadata.insert(MetadataField::ProductCategory, category.as_str());
        }
        metadata.insert(MetadataField::PowerType, self.power_type.as_str());
        if let Some(ref model) = self.model_number {
            metadata.insert(MetadataField::ModelNumber, model.as_str());
        }
        if let Some(ref series) = self.model_series {
            metadata.insert(MetadataField::ModelSeries, series.as_str());
        }
        metadata.insert(MetadataField::Specificity, self.specificity.as_str());
        if let Some(ref models) = self.applicable_models {
            if !models.is_empty() {
                metadata.insert_raw(APPLICABLE_MODELS_KEY, models.join(LIST_SEPARATOR));
            }
        }
        if !self.tags.is_empty() {
            metadata.insert_raw(TAGS_KEY, self.tags.join(LIST_SEPARATOR));
        }

        metadata
    }
}

// =============================================================================
// METADATA
// =============================================================================

/// Metadata key for the joined `applicable_models` list.
pub const APPLICABLE_MODELS_KEY: &str = "applicable_models";

/// Metadata key for the joined free-text tag list.
pub const TAGS_KEY: &str = "tags";

/// Scalar metadata fields that filter expressions can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    ModelNumber,
    ModelSeries,
    ProductCategory,
    PowerType,
    Specificity,
    Collection,
}

impl MetadataField {
    /// Key under which the field is stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ModelNumber => "model_number",
            Self::ModelSeries => "model_series",
            Self::ProductCategory => "product_category",
            Self::PowerType => "power_type",
            Self::Specificity => "specificity",
            Self::Collection => "collection",
        }
    }
}

impl std::fmt::Display for MetadataField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MetadataField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "model_number" => Ok(Self::ModelNumber),
            "model_series" => Ok(Self::ModelSeries),
            "product_category" => Ok(Self::ProductCategory),
            "power_type" => Ok(Self::PowerType),
            "specificity" => Ok(Self::Specificity),
            "collection" => Ok(Self::Collection),
            _ => Err(Error::InvalidInput(format!("Invalid metadata field: {}", s))),
        }
    }
}

/// Flat, scalar-only metadata map as persisted on vector-store chunks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentMetadata(Map<String, JsonValue>);

impl DocumentMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a filterable field.
    pub fn insert(&mut self, field: MetadataField, value: impl Into<String>) {
        self.0
            .insert(field.as_str().to_string(), JsonValue::String(value.into()));
    }

    fn insert_raw(&mut self, key: &str, value: String) {
        self.0.insert(key.to_string(), JsonValue::String(value));
    }

    /// Attach the collection the document was ingested into.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        let collection = collection.into();
        if !collection.is_empty() {
            self.insert(MetadataField::Collection, collection);
        }
        self
    }

    /// String value of a filterable field, if present.
    pub fn get_str(&self, field: MetadataField) -> Option<&str> {
        self.0.get(field.as_str()).and_then(JsonValue::as_str)
    }

    /// Raw access by key, including the list-valued keys.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Map<String, JsonValue> {
        self.0
    }
}

impl From<Map<String, JsonValue>> for DocumentMetadata {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }
}

// =============================================================================
// TESTS
// =============================================================================
