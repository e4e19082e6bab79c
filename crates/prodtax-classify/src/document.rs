//! Ingestion-time document classification.
//!
//! [`DocumentClassifier::classify`] derives a [`DocumentTags`] record from a
//! document's filename, path and content. It is composed of independently
//! callable steps, run in this order:
//!
//! 1. category detection (path markers, then model patterns on the content)
//! 2. model-number extraction for that category
//! 3. power-type detection seeded by the first model
//! 4. specificity detection seeded by the models and the filename
//!
//! Every step is total: a missing signal yields `None`, [`PowerType::Unknown`]
//! or the broadest applicable specificity, never an error.

use std::collections::HashSet;

use prodtax_core::{
    DocumentMetadata, DocumentSpecificity, DocumentTags, PowerType, ProductCategory, Taxonomy,
};
use serde::Serialize;
use tracing::{debug, instrument, trace};

/// Which specificity rule fired, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecificityReason {
    /// Filename contains a general-knowledge marker ("general", "overview").
    GeneralFilename,
    /// Exactly one model, and the filename names it.
    ConfirmedInFilename,
    /// Category known, no model tokens.
    CategoryWithoutModels,
    /// More than one distinct model token.
    MultipleModels,
    /// Exactly one model found in the content but absent from the filename.
    /// Still product-specific: content-derived model numbers are trusted.
    UnconfirmedSingleModel,
    /// No category and no models.
    NoSignal,
}

impl SpecificityReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeneralFilename => "general_filename",
            Self::ConfirmedInFilename => "confirmed_in_filename",
            Self::CategoryWithoutModels => "category_without_models",
            Self::MultipleModels => "multiple_models",
            Self::UnconfirmedSingleModel => "unconfirmed_single_model",
            Self::NoSignal => "no_signal",
        }
    }
}

impl std::fmt::Display for SpecificityReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies ingested documents against a borrowed [`Taxonomy`].
#[derive(Debug, Clone, Copy)]
pub struct DocumentClassifier<'t> {
    taxonomy: &'t Taxonomy,
}

impl Default for DocumentClassifier<'static> {
    fn default() -> Self {
        Self::new(Taxonomy::shared())
    }
}

impl<'t> DocumentClassifier<'t> {
    pub fn new(taxonomy: &'t Taxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &'t Taxonomy {
        self.taxonomy
    }

    /// Detect the product category.
    ///
    /// Path markers are tested first against the lowercased concatenation of
    /// filename, path and content, in taxonomy order. Failing that, each
    /// category's model pattern is tested against the raw content, again in
    /// taxonomy order.
    pub fn detect_product_category(
        &self,
        filename: &str,
        file_path: &str,
        content: &str,
    ) -> Option<ProductCategory> {
        let haystack = format!("{}{}{}", filename, file_path, content).to_lowercase();

        if let Some(rules) = self
            .taxonomy
            .categories()
            .iter()
            .find(|rules| rules.has_path_marker(&haystack))
        {
            debug!(category = %rules.category(), rule = "path_marker", "Category detected");
            return Some(rules.category());
        }

        let by_pattern = self
            .taxonomy
            .patterns()
            .find(|pattern| pattern.is_match(content))
            .map(|pattern| pattern.category());

        match by_pattern {
            Some(category) => {
                debug!(category = %category, rule = "model_pattern", "Category detected")
            }
            None => debug!(rule = "none", "No category detected"),
        }
        by_pattern
    }

    /// All model tokens of `category` in `text`: uppercased, de-duplicated,
    /// in first-occurrence order.
    pub fn extract_model_numbers(
        &self,
        text: &str,
        category: Option<ProductCategory>,
    ) -> Vec<String> {
        let Some(pattern) = category.and_then(|c| self.taxonomy.pattern_for(c)) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut models = Vec::new();
        for token in pattern.find_all(text) {
            let model = token.to_uppercase();
            trace!(model_number = %model, "Model token matched");
            if seen.insert(model.clone()) {
                models.push(model);
            }
        }
        models
    }

    /// Infer the power type.
    ///
    /// Battery-only OPE series win outright, then robots with a known model
    /// are battery by policy, then keyword presence in the content decides
    /// (each keyword counts once; ties are unknown).
    pub fn detect_power_type(
        &self,
        content: &str,
        model_number: Option<&str>,
        category: Option<ProductCategory>,
    ) -> PowerType {
        if let Some(model) = model_number {
            if category == Some(ProductCategory::Ope) && self.taxonomy.is_battery_override(model) {
                debug!(model_number = %model, rule = "battery_override", "Power type: battery");
                return PowerType::Battery;
            }
            if category == Some(ProductCategory::Robot) {
                debug!(model_number = %model, rule = "robot_policy", "Power type: battery");
                return PowerType::Battery;
            }
        }

        let content = content.to_lowercase();
        let battery = count_present(&content, self.taxonomy.battery_keywords());
        let fuel = count_present(&content, self.taxonomy.fuel_keywords());

        let power_type = if battery > fuel && battery > 0 {
            PowerType::Battery
        } else if fuel > battery && fuel > 0 {
            PowerType::Fuel
        } else {
            PowerType::Unknown
        };

        debug!(
            battery_hits = battery,
            fuel_hits = fuel,
            rule = "keywords",
            power_type = %power_type,
            "Power type detected"
        );
        power_type
    }

    /// Decide how narrowly the document applies.
    pub fn detect_specificity(
        &self,
        model_numbers: &[String],
        category: Option<ProductCategory>,
        filename: &str,
    ) -> DocumentSpecificity {
        self.detect_specificity_with_reason(model_numbers, category, filename)
            .0
    }

    /// [`detect_specificity`](Self::detect_specificity) plus the rule that fired.
    pub fn detect_specificity_with_reason(
        &self,
        model_numbers: &[String],
        category: Option<ProductCategory>,
        filename: &str,
    ) -> (DocumentSpecificity, SpecificityReason) {
        let filename = filename.to_lowercase();

        let decision = if self
            .taxonomy
            .general_filename_markers()
            .iter()
            .any(|marker| filename.contains(marker.as_str()))
        {
            (
                DocumentSpecificity::General,
                SpecificityReason::GeneralFilename,
            )
        } else {
            match (model_numbers, category) {
                ([only], _) if filename.contains(&only.to_lowercase()) => (
                    DocumentSpecificity::ProductSpecific,
                    SpecificityReason::ConfirmedInFilename,
                ),
                ([], Some(_)) => (
                    DocumentSpecificity::CategoryCommon,
                    SpecificityReason::CategoryWithoutModels,
                ),
                ([_, _, ..], _) => (
                    DocumentSpecificity::CategoryCommon,
                    SpecificityReason::MultipleModels,
                ),
                ([_], _) => (
                    DocumentSpecificity::ProductSpecific,
                    SpecificityReason::UnconfirmedSingleModel,
                ),
                ([], None) => (DocumentSpecificity::General, SpecificityReason::NoSignal),
            }
        };

        debug!(
            specificity = %decision.0,
            rule = %decision.1,
            model_count = model_numbers.len(),
            "Specificity detected"
        );
        decision
    }

    /// Classify one document.
    #[instrument(skip_all, fields(
        subsystem = "classify",
        component = "document_classifier",
        op = "classify_document",
        filename = %filename,
        collection = %collection_name,
        content_len = content.len(),
    ))]
    pub fn classify(
        &self,
        filename: &str,
        file_path: &str,
        content: &str,
        collection_name: &str,
    ) -> DocumentTags {
        let category = self.detect_product_category(filename, file_path, content);

        let text = format!("{} {}", filename, content);
        let models = self.extract_model_numbers(&text, category);
        let model_number = models.first().cloned();

        let power_type = self.detect_power_type(content, model_number.as_deref(), category);
        let specificity = self.detect_specificity(&models, category, filename);
        let model_series = extract_model_series(model_number.as_deref());
        if let (Some(series), Some(pattern)) = (
            model_series.as_deref(),
            category.and_then(|c| self.taxonomy.pattern_for(c)),
        ) {
            if !pattern.is_valid_series(series) {
                debug!(model_series = %series, "Model series not registered for category");
            }
        }

        let tags = DocumentTags::build_tag_list(collection_name, category, specificity, power_type);
        let applicable_models = (models.len() > 1).then_some(models);

        debug!(
            category = category.map(|c| c.as_str()).unwrap_or("none"),
            model_number = model_number.as_deref().unwrap_or("none"),
            power_type = %power_type,
            specificity = %specificity,
            "Document classified"
        );

        DocumentTags {
            product_category: category,
            power_type,
            model_number,
            model_series,
            specificity,
            applicable_models,
            tags,
        }
    }

    /// Classify and flatten into the scalar metadata stored on chunks,
    /// including the collection name.
    pub fn classify_metadata(
        &self,
        filename: &str,
        file_path: &str,
        content: &str,
        collection_name: &str,
    ) -> DocumentMetadata {
        self.classify(filename, file_path, content, collection_name)
            .to_metadata()
            .with_collection(collection_name)
    }
}

/// Longest leading run of alphabetic characters: `DHCAS` for `DHCAS-2600HD`.
///
/// Returns `None` for no model, or for a model that does not start with a
/// letter.
pub fn extract_model_series(model_number: Option<&str>) -> Option<String> {
    let series: String = model_number?
        .chars()
        .take_while(|c| c.is_alphabetic())
        .collect();
    (!series.is_empty()).then_some(series)
}

fn count_present(lowercase_content: &str, keywords: &[String]) -> usize {
    keywords
        .iter()
        .filter(|keyword| {
            let hit = lowercase_content.contains(keyword.as_str());
            if hit {
                trace!(keyword = %keyword, "Power keyword present");
            }
            hit
        })
        .count()
}
