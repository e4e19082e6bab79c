//! Taxonomy model: ordered per-category model patterns and keyword tables.
//!
//! A [`Taxonomy`] is an immutable value built once through
//! [`TaxonomyBuilder`] and shared by reference with both classifiers. The
//! categories are kept in an ordered `Vec`, never a map: when a text matches
//! more than one category's pattern, the earliest registered category wins.
//!
//! # Token boundaries
//!
//! Model tokens must be bounded by non-alphanumeric characters (Unicode
//! letters and numbers count as alphanumeric). The `regex` crate has no
//! lookaround, so every pattern is wrapped as
//!
//! ```text
//! (?i)(?:^|[^\p{L}\p{N}])(?P<token>PATTERN)(?:[^\p{L}\p{N}]|$)
//! ```
//!
//! and scanning resumes at the end of the `token` group rather than the end
//! of the whole match. The trailing boundary character is therefore examined
//! but never consumed, and `TM-850,TM-2000` yields both tokens.
//!
//! # Example
//!
//! ```
//! use prodtax_core::{ProductCategory, Taxonomy};
//!
//! let taxonomy = Taxonomy::shared();
//! let robot = taxonomy.pattern_for(ProductCategory::Robot).unwrap();
//! assert_eq!(robot.find_all("see TM-850, TM-2000"), vec!["TM-850", "TM-2000"]);
//! assert!(robot.find_first("XTM-850").is_none());
//! ```

pub mod builtin;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::ProductCategory;

/// Characters that may not touch a token on either side.
const BOUNDARY_CLASS: &str = r"[^\p{L}\p{N}]";

static SHARED: Lazy<Taxonomy> =
    Lazy::new(|| builtin::taxonomy().expect("built-in taxonomy tables must compile"));

// =============================================================================
// MODEL PATTERN
// =============================================================================

/// Model-number pattern for one product category.
#[derive(Debug, Clone)]
pub struct ModelPattern {
    category: ProductCategory,
    source: String,
    series: Vec<String>,
    regex: Regex,
}

impl ModelPattern {
    /// Compile `source` as a case-insensitive, boundary-anchored token pattern.
    pub fn new(
        category: ProductCategory,
        source: impl Into<String>,
        series: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self> {
        let source = source.into();
        let series: Vec<String> = series.into_iter().map(Into::into).collect();

        if series.is_empty() {
            return Err(Error::Config(format!(
                "Category {} has no series prefixes",
                category
            )));
        }

        let bare = Regex::new(&format!("(?i)^(?:{})$", source))
            .map_err(|source| Error::InvalidPattern { category, source })?;
        if bare.is_match("") {
            return Err(Error::Config(format!(
                "Pattern for category {} matches the empty string",
                category
            )));
        }

        let regex = Regex::new(&format!(
            "(?i)(?:^|{b})(?P<token>{p})(?:{b}|$)",
            b = BOUNDARY_CLASS,
            p = source
        ))
        .map_err(|source| Error::InvalidPattern { category, source })?;

        Ok(Self {
            category,
            source,
            series,
            regex,
        })
    }

    pub fn category(&self) -> ProductCategory {
        self.category
    }

    /// The pattern as registered, without boundary wrapping.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn series(&self) -> &[String] {
        &self.series
    }

    /// Whether `series` starts with one of this category's series prefixes.
    pub fn is_valid_series(&self, series: &str) -> bool {
        let series = series.to_uppercase();
        !series.is_empty()
            && self
                .series
                .iter()
                .any(|prefix| series.starts_with(&prefix.to_uppercase()))
    }

    /// Whether any whole token in `text` matches.
    pub fn is_match(&self, text: &str) -> bool {
        self.find_first(text).is_some()
    }

    /// First whole token in `text`, exactly as it appears.
    pub fn find_first<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.name("token"))
            .map(|m| m.as_str())
    }

    /// Every whole token in `text`, left to right, exactly as they appear.
    pub fn find_all<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut tokens = Vec::new();
        let mut at = 0;

        while at <= text.len() {
            let Some(token) = self
                .regex
                .captures_at(text, at)
                .and_then(|caps| caps.name("token"))
            else {
                break;
            };
            if token.is_empty() {
                at = next_char_boundary(text, token.end());
                continue;
            }
            tokens.push(token.as_str());
            // Resume on the trailing boundary so it can lead the next token.
            at = token.end();
        }

        tokens
    }
}

impl Serialize for ModelPattern {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("ModelPattern", 3)?;
        s.serialize_field("category", &self.category)?;
        s.serialize_field("pattern", &self.source)?;
        s.serialize_field("series", &self.series)?;
        s.end()
    }
}

// =============================================================================
// CATEGORY RULES
// =============================================================================

/// Everything the classifiers know about one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRules {
    #[serde(flatten)]
    pub pattern: ModelPattern,

    /// Lowercase substrings of filename/path/content that name the category.
    pub path_markers: Vec<String>,

    /// Lowercase words that name the category in a query.
    pub query_keywords: Vec<String>,

    #[serde(skip)]
    query_regex: Option<Regex>,
}

impl CategoryRules {
    pub fn category(&self) -> ProductCategory {
        self.pattern.category
    }

    /// Whether the lowercased haystack contains one of the path markers.
    pub fn has_path_marker(&self, lowercase_haystack: &str) -> bool {
        self.path_markers
            .iter()
            .any(|marker| lowercase_haystack.contains(marker.as_str()))
    }

    /// Whether the query names this category as a whole word.
    pub fn is_named_in_query(&self, query: &str) -> bool {
        self.query_regex
            .as_ref()
            .map(|re| re.is_match(query))
            .unwrap_or(false)
    }
}

// =============================================================================
// TAXONOMY
// =============================================================================

/// Immutable domain vocabulary shared by the document and query classifiers.
#[derive(Debug, Clone, Serialize)]
pub struct Taxonomy {
    categories: Vec<CategoryRules>,
    battery_series_overrides: Vec<String>,
    battery_keywords: Vec<String>,
    fuel_keywords: Vec<String>,
    general_filename_markers: Vec<String>,
}

impl Taxonomy {
    pub fn builder() -> TaxonomyBuilder {
        TaxonomyBuilder::new()
    }

    /// Build the compiled-in vocabulary.
    pub fn builtin() -> Result<Self> {
        builtin::taxonomy()
    }

    /// Process-wide built-in taxonomy, compiled on first use.
    pub fn shared() -> &'static Taxonomy {
        &SHARED
    }

    /// Category rules in taxonomy order.
    pub fn categories(&self) -> &[CategoryRules] {
        &self.categories
    }

    /// Model patterns in taxonomy order.
    pub fn patterns(&self) -> impl Iterator<Item = &ModelPattern> {
        self.categories.iter().map(|rules| &rules.pattern)
    }

    pub fn rules_for(&self, category: ProductCategory) -> Option<&CategoryRules> {
        self.categories
            .iter()
            .find(|rules| rules.category() == category)
    }

    pub fn pattern_for(&self, category: ProductCategory) -> Option<&ModelPattern> {
        self.rules_for(category).map(|rules| &rules.pattern)
    }

    pub fn battery_keywords(&self) -> &[String] {
        &self.battery_keywords
    }

    pub fn fuel_keywords(&self) -> &[String] {
        &self.fuel_keywords
    }

    pub fn battery_series_overrides(&self) -> &[String] {
        &self.battery_series_overrides
    }

    pub fn general_filename_markers(&self) -> &[String] {
        &self.general_filename_markers
    }

    /// Whether `model_number` starts with a battery-only series prefix.
    pub fn is_battery_override(&self, model_number: &str) -> bool {
        let model = model_number.to_uppercase();
        self.battery_series_overrides
            .iter()
            .any(|prefix| model.starts_with(prefix.as_str()))
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Registration data for one category.
#[derive(Debug, Clone)]
pub struct CategorySpec {
    category: ProductCategory,
    pattern: String,
    series: Vec<String>,
    path_markers: Vec<String>,
    query_keywords: Vec<String>,
}

impl CategorySpec {
    pub fn new(category: ProductCategory, pattern: impl Into<String>) -> Self {
        Self {
            category,
            pattern: pattern.into(),
            series: Vec::new(),
            path_markers: Vec::new(),
            query_keywords: Vec::new(),
        }
    }

    pub fn with_series(mut self, series: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.series.extend(series.into_iter().map(Into::into));
        self
    }

    pub fn with_path_markers(
        mut self,
        markers: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.path_markers.extend(markers.into_iter().map(Into::into));
        self
    }

    pub fn with_query_keywords(
        mut self,
        keywords: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.query_keywords
            .extend(keywords.into_iter().map(Into::into));
        self
    }
}

/// Validating builder for [`Taxonomy`].
///
/// Categories are kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyBuilder {
    categories: Vec<CategorySpec>,
    battery_series_overrides: Vec<String>,
    battery_keywords: Vec<String>,
    fuel_keywords: Vec<String>,
    general_filename_markers: Vec<String>,
}

impl TaxonomyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a category. Registration order is tie-break order.
    pub fn category(mut self, spec: CategorySpec) -> Self {
        self.categories.push(spec);
        self
    }

    pub fn battery_series_overrides(
        mut self,
        prefixes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.battery_series_overrides
            .extend(prefixes.into_iter().map(Into::into));
        self
    }

    pub fn battery_keywords(
        mut self,
        keywords: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.battery_keywords
            .extend(keywords.into_iter().map(Into::into));
        self
    }

    pub fn fuel_keywords(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fuel_keywords
            .extend(keywords.into_iter().map(Into::into));
        self
    }

    pub fn general_filename_markers(
        mut self,
        markers: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.general_filename_markers
            .extend(markers.into_iter().map(Into::into));
        self
    }

    /// Compile and validate.
    pub fn build(self) -> Result<Taxonomy> {
        let mut categories: Vec<CategoryRules> = Vec::with_capacity(self.categories.len());

        for spec in self.categories {
            if categories.iter().any(|c| c.category() == spec.category) {
                return Err(Error::Config(format!(
                    "Category {} registered more than once",
                    spec.category
                )));
            }

            let pattern = ModelPattern::new(spec.category, spec.pattern, spec.series)?;
            let path_markers = lowercase_all(spec.path_markers);
            let query_keywords = lowercase_all(spec.query_keywords);
            let query_regex = compile_keyword_regex(spec.category, &query_keywords)?;

            categories.push(CategoryRules {
                pattern,
                path_markers,
                query_keywords,
                query_regex,
            });
        }

        if categories.is_empty() {
            return Err(Error::Config("Taxonomy has no categories".to_string()));
        }

        let taxonomy = Taxonomy {
            categories,
            battery_series_overrides: self
                .battery_series_overrides
                .into_iter()
                .map(|p| p.to_uppercase())
                .filter(|p| !p.is_empty())
                .collect(),
            battery_keywords: lowercase_all(self.battery_keywords),
            fuel_keywords: lowercase_all(self.fuel_keywords),
            general_filename_markers: lowercase_all(self.general_filename_markers),
        };

        debug!(
            subsystem = "classify",
            component = "taxonomy",
            categories = taxonomy.categories.len(),
            battery_keywords = taxonomy.battery_keywords.len(),
            fuel_keywords = taxonomy.fuel_keywords.len(),
            "Taxonomy built"
        );

        Ok(taxonomy)
    }
}

fn next_char_boundary(text: &str, at: usize) -> usize {
    text[at..]
        .chars()
        .next()
        .map(|c| at + c.len_utf8())
        .unwrap_or(text.len() + 1)
}

fn lowercase_all(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

fn compile_keyword_regex(category: ProductCategory, keywords: &[String]) -> Result<Option<Regex>> {
    if keywords.is_empty() {
        return Ok(None);
    }

    let alternation = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(
        "(?i)(?:^|{b})(?:{a})(?:{b}|$)",
        b = BOUNDARY_CLASS,
        a = alternation
    ))
    .map(Some)
    .map_err(|source| Error::InvalidPattern { category, source })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn robot() -> ModelPattern {
        ModelPattern::new(
            ProductCategory::Robot,
            builtin::ROBOT_PATTERN,
            builtin::ROBOT_SERIES.iter().copied(),
        )
        .unwrap()
    }

    #[test]
    fn test_builtin_compiles_in_taxonomy_order() {
        let taxonomy = Taxonomy::builtin().unwrap();
        let order: Vec<_> = taxonomy.patterns().map(|p| p.category()).collect();
        assert_eq!(order, ProductCategory::ALL.to_vec());
    }

    #[test]
    fn test_shared_is_single_instance() {
        assert!(std::ptr::eq(Taxonomy::shared(), Taxonomy::shared()));
    }

    #[test]
    fn test_find_all_adjacent_tokens() {
        let pattern = robot();
        assert_eq!(
            pattern.find_all("TM-850,TM-2000 TM-2050"),
            vec!["TM-850", "TM-2000", "TM-2050"]
        );
    }

    #[test]
    fn test_builtin_patterns_only_take_ascii_digits() {
        let taxonomy = Taxonomy::shared();
        let robot = taxonomy.pattern_for(ProductCategory::Robot).unwrap();
        // Arabic-Indic and fullwidth digits
        assert!(robot.find_all("TM-٨٥٠").is_empty());
        assert!(robot.find_all("TM-８５０").is_empty());

        let ope = taxonomy.pattern_for(ProductCategory::Ope).unwrap();
        assert!(ope.find_all("DCS-５０００").is_empty());
        let erco = taxonomy.pattern_for(ProductCategory::Erco).unwrap();
        assert!(erco.find_all("ER-٢٥٠").is_empty());
    }

    #[test]
    fn test_find_all_requires_boundaries() {
        let pattern = robot();
        assert!(pattern.find_all("XTM-850").is_empty());
        assert!(pattern.find_all("TM-8501234").is_empty());
        assert!(pattern.find_all("TM-850ABC").is_empty());
        assert_eq!(pattern.find_all("(TM-850)"), vec!["TM-850"]);
        assert_eq!(pattern.find_all("TM-850_manual"), vec!["TM-850"]);
    }

    #[test]
    fn test_unicode_letters_are_not_boundaries() {
        let pattern = robot();
        assert!(pattern.find_all("éTM-850").is_empty());
        assert_eq!(pattern.find_all("für TM-850."), vec!["TM-850"]);
    }

    #[test]
    fn test_case_insensitive_preserves_original_text() {
        let pattern = robot();
        assert_eq!(pattern.find_first("the tm-850 unit"), Some("tm-850"));
    }

    #[test]
    fn test_is_valid_series() {
        let taxonomy = Taxonomy::shared();
        let ope = taxonomy.pattern_for(ProductCategory::Ope).unwrap();
        assert!(ope.is_valid_series("DHCAS"));
        assert!(ope.is_valid_series("lbp"));
        assert!(!ope.is_valid_series("TM"));
        assert!(!ope.is_valid_series(""));
    }

    #[test]
    fn test_battery_override() {
        let taxonomy = Taxonomy::shared();
        assert!(taxonomy.is_battery_override("DCS-5000"));
        assert!(taxonomy.is_battery_override("lcjq-300"));
        assert!(!taxonomy.is_battery_override("CS-3510"));
    }

    #[test]
    fn test_query_keywords_whole_word() {
        let rules = Taxonomy::shared()
            .rules_for(ProductCategory::Ope)
            .unwrap();
        assert!(rules.is_named_in_query("best chainsaw oil"));
        assert!(rules.is_named_in_query("OPE-Geräte Übersicht"));
        assert!(!rules.is_named_in_query("I hope it works"));
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let err = Taxonomy::builder()
            .category(CategorySpec::new(ProductCategory::Robot, "TM-\\d+").with_series(["TM"]))
            .category(CategorySpec::new(ProductCategory::Robot, "RX-\\d+").with_series(["RX"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = Taxonomy::builder()
            .category(CategorySpec::new(ProductCategory::Erco, "ER-(\\d+").with_series(["ER"]))
            .build()
            .unwrap_err();
        match err {
            Error::InvalidPattern { category, .. } => assert_eq!(category, ProductCategory::Erco),
            other => panic!("Expected InvalidPattern, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_matching_pattern_rejected() {
        let err = ModelPattern::new(ProductCategory::Ope, "D*", ["D"]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_series_rejected() {
        let err = ModelPattern::new(ProductCategory::Ope, "D-\\d+", Vec::<String>::new())
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_empty_taxonomy_rejected() {
        assert!(Taxonomy::builder().build().is_err());
    }

    #[test]
    fn test_taxonomy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Taxonomy>();
    }

    #[test]
    fn test_serializes_without_compiled_regex() {
        let json = serde_json::to_value(Taxonomy::shared()).unwrap();
        let first = &json["categories"][0];
        assert_eq!(first["category"], "robot");
        assert_eq!(first["pattern"], builtin::ROBOT_PATTERN);
        assert!(first.get("query_regex").is_none());
    }
}
