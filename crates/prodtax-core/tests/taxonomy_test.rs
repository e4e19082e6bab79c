//! Integration tests for building and inspecting taxonomies.

use prodtax_core::{CategorySpec, Error, ProductCategory, Taxonomy};

fn erco_only() -> CategorySpec {
    CategorySpec::new(ProductCategory::Erco, r"(?:ER|EH)-[0-9]{3}")
        .with_series(["ER", "EH"])
        .with_path_markers(["Erco-"])
        .with_query_keywords(["Erco", "zero turn"])
}

#[test]
fn test_builtin_order_is_robot_ope_erco() {
    let order: Vec<_> = Taxonomy::shared()
        .categories()
        .iter()
        .map(|rules| rules.category())
        .collect();
    assert_eq!(order, ProductCategory::ALL.to_vec());
}

#[test]
fn test_builtin_matches_shared() {
    let built = Taxonomy::builtin().unwrap();
    let shared = Taxonomy::shared();
    assert_eq!(
        serde_json::to_value(&built).unwrap(),
        serde_json::to_value(shared).unwrap()
    );
}

#[test]
fn test_custom_taxonomy_lowercases_markers_and_keywords() {
    let taxonomy = Taxonomy::builder()
        .category(erco_only())
        .battery_series_overrides(["eh"])
        .general_filename_markers(["README"])
        .build()
        .unwrap();

    let rules = taxonomy.rules_for(ProductCategory::Erco).unwrap();
    assert_eq!(rules.path_markers, vec!["erco-"]);
    assert!(rules.has_path_marker("/srv/erco-docs/x.pdf"));
    assert!(rules.is_named_in_query("Best ZERO TURN mower?"));
    assert!(!rules.is_named_in_query("zero turning radius"));

    assert!(taxonomy.is_battery_override("EH-200"));
    assert!(!taxonomy.is_battery_override("ER-200"));
    assert_eq!(taxonomy.general_filename_markers(), ["readme".to_string()]);
    assert!(taxonomy.pattern_for(ProductCategory::Robot).is_none());
}

#[test]
fn test_custom_pattern_token_boundaries() {
    let taxonomy = Taxonomy::builder().category(erco_only()).build().unwrap();
    let pattern = taxonomy.pattern_for(ProductCategory::Erco).unwrap();

    assert_eq!(pattern.find_all("ER-100/EH-200;er-100"), vec!["ER-100", "EH-200", "er-100"]);
    // Four digits is a different token, not a prefix match
    assert!(pattern.find_first("ER-1000").is_none());
    assert!(pattern.is_valid_series("eh"));
    assert!(!pattern.is_valid_series("EV"));
}

#[test]
fn test_duplicate_category_rejected() {
    let err = Taxonomy::builder()
        .category(erco_only())
        .category(erco_only())
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_invalid_pattern_rejected() {
    let err = Taxonomy::builder()
        .category(CategorySpec::new(ProductCategory::Ope, r"(D-\d{3}").with_series(["D"]))
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidPattern {
            category: ProductCategory::Ope,
            ..
        }
    ));
}

#[test]
fn test_empty_matching_pattern_rejected() {
    let err = Taxonomy::builder()
        .category(CategorySpec::new(ProductCategory::Robot, r"(?:TM)?\d*").with_series(["TM"]))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_taxonomy_serializes_patterns_not_regexes() {
    let value = serde_json::to_value(Taxonomy::shared()).unwrap();
    let first = &value["categories"][0];

    assert_eq!(first["category"], "robot");
    assert!(first["pattern"].as_str().unwrap().contains("TM"));
    assert!(first.get("query_regex").is_none());
    assert!(value["battery_series_overrides"]
        .as_array()
        .unwrap()
        .iter()
        .any(|v| v == "LBP"));
}
