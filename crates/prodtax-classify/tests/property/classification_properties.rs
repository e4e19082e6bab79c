use prodtax_classify::{
    build_search_filter, classify_document, extract_model_from_query, extract_model_numbers,
    DocumentSpecificity, DocumentTags, ProductCategory,
};
use proptest::prelude::*;

const FRAGMENTS: &[&str] = &[
    "TM-850",
    "tm-2000",
    "RLM-1200",
    "DR-500",
    "DCS-5000",
    "dtt-2100",
    "DHCAS-2600HD",
    "LBP-560",
    "CS-3510",
    "ER-250",
    "EV-1800",
    "robot",
    "ope-",
    "erco-",
    "general",
    "overview",
    "manual",
    "battery",
    "petrol",
    "fuel",
    "cordless",
    "spark plug",
    "Akku",
    "Kettensäge",
    "XTM-850",
    "TM-85",
    "0815",
];

fn text_strategy(max_parts: usize) -> impl Strategy<Value = String> {
    let part = prop_oneof![
        3 => prop::sample::select(FRAGMENTS).prop_map(str::to_string),
        1 => "[a-zA-Z0-9 ._/-]{0,12}",
    ];
    let sep = prop::sample::select(vec![" ", "-", "_", "/", ", ", ""]);
    prop::collection::vec((part, sep), 0..max_parts).prop_map(|parts| {
        parts
            .into_iter()
            .map(|(part, sep)| format!("{part}{sep}"))
            .collect()
    })
}

fn assert_invariants(tags: &DocumentTags) -> Result<(), TestCaseError> {
    if let Some(ref series) = tags.model_series {
        let model = tags
            .model_number
            .as_deref()
            .ok_or_else(|| TestCaseError::fail("series without a model"))?;
        let prefix: String = model.chars().take_while(|c| c.is_alphabetic()).collect();
        prop_assert_eq!(series, &prefix);
    }

    if let Some(ref models) = tags.applicable_models {
        prop_assert!(models.len() > 1, "applicable_models with {} entries", models.len());
        prop_assert_eq!(models.first(), tags.model_number.as_ref());
    }

    match tags.specificity {
        DocumentSpecificity::ProductSpecific => {
            prop_assert!(tags.model_number.is_some());
            prop_assert!(tags.applicable_models.is_none());
        }
        DocumentSpecificity::CategoryCommon => {
            let zero_with_category =
                tags.model_number.is_none() && tags.product_category.is_some();
            let many = tags.applicable_models.is_some();
            prop_assert!(zero_with_category || many, "category_common: {:?}", tags);
        }
        DocumentSpecificity::General => {}
    }

    let category_tag = tags
        .product_category
        .map(|c| c.as_str())
        .unwrap_or("uncategorized");
    prop_assert!(tags.tags.iter().any(|t| t == category_tag));
    prop_assert!(tags.tags.iter().any(|t| t == tags.specificity.as_str()));
    prop_assert!(tags.tags.iter().any(|t| t == tags.power_type.as_str()));
    prop_assert!(tags.tags.iter().all(|t| !t.is_empty()));
    Ok(())
}

// ── Classified documents always satisfy the record invariants ─────────────

proptest! {
    #[test]
    fn classified_documents_satisfy_invariants(
        filename in text_strategy(4),
        dir in text_strategy(3),
        content in text_strategy(12),
        collection in "[a-z-]{0,12}",
    ) {
        let path = format!("/docs/{dir}/{filename}");
        let tags = classify_document(&filename, &path, &content, &collection);
        assert_invariants(&tags)?;
    }

    #[test]
    fn classification_is_total_on_arbitrary_text(
        filename in ".{0,40}",
        content in ".{0,300}",
    ) {
        let tags = classify_document(&filename, &filename, &content, "fuzz");
        assert_invariants(&tags)?;
    }

    #[test]
    fn classification_is_deterministic(
        filename in text_strategy(4),
        content in text_strategy(12),
    ) {
        let first = classify_document(&filename, "/docs", &content, "c");
        let second = classify_document(&filename, "/docs", &content, "c");
        prop_assert_eq!(first, second);
    }
}

// ── Model extraction ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn extracted_models_are_uppercase_and_distinct(
        text in text_strategy(16),
        category in prop::sample::select(ProductCategory::ALL.to_vec()),
    ) {
        let models = extract_model_numbers(&text, Some(category));
        for model in &models {
            prop_assert_eq!(model, &model.to_uppercase());
        }
        let mut deduped = models.clone();
        deduped.sort();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), models.len());
    }

    #[test]
    fn extraction_is_stable_under_repetition(
        text in text_strategy(8),
        category in prop::sample::select(ProductCategory::ALL.to_vec()),
    ) {
        // Appending the text to itself adds no new models and keeps order
        let once = extract_model_numbers(&text, Some(category));
        let twice = extract_model_numbers(&format!("{text} {text}"), Some(category));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn robot_model_found_in_any_surrounding(
        number in 100u32..10000,
        before in "[ ,.;(/]{1,3}",
        after in "[ ,.;)/]{1,3}",
    ) {
        let text = format!("see{before}TM-{number}{after}for details");
        let models = extract_model_numbers(&text, Some(ProductCategory::Robot));
        prop_assert_eq!(models, vec![format!("TM-{number}")]);
    }
}

// ── Query filters ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn non_blank_queries_always_get_a_filter(query in ".{0,80}") {
        let filter = build_search_filter(&query);
        prop_assert_eq!(filter.is_some(), !query.trim().is_empty());
    }

    #[test]
    fn model_queries_match_their_own_documents(
        filename in text_strategy(3),
        content in text_strategy(10),
    ) {
        let tags = classify_document(&filename, "/docs", &content, "c");
        if let (Some(model), Some(category)) = (tags.model_number.clone(), tags.product_category) {
            let query = format!("problem with {model}");
            let found = extract_model_from_query(&query);
            if found.model_number.as_deref() == Some(model.as_str())
                && found.category == Some(category)
            {
                let filter = build_search_filter(&query).unwrap();
                prop_assert!(filter.matches(&tags.to_metadata()));
            }
        }
    }
}
