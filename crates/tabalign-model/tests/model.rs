use tabalign_model::{AlignOptions, KeyCandidatePolicy};

#[test]
fn options_default_values() {
    let options = AlignOptions::default();
    assert_eq!(options.max_join_keys, 2);
    assert!(options.dedupe_single_table);
    assert_eq!(options.key_candidates.exact_threshold, 0.9);
    assert!(options.min_match_score.is_none());
}

#[test]
fn options_fill_missing_fields_from_defaults() {
    let json = r#"{ "max_join_keys": 1, "key_candidates": { "exact_threshold": 0.8 } }"#;
    let options: AlignOptions = serde_json::from_str(json).expect("deserialize options");
    assert_eq!(options.max_join_keys, 1);
    assert_eq!(
        options.key_candidates,
        KeyCandidatePolicy {
            exact_threshold: 0.8,
            max_candidates: None,
        }
    );
    assert!(options.dedupe_single_table);
}

#[test]
fn max_join_keys_never_zero() {
    let options = AlignOptions::new().with_max_join_keys(0);
    assert_eq!(options.max_join_keys, 1);
}
