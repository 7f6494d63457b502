//! Tests for the identity mapper
//!
//! Copyright (c) 2025 cms-bridge contributors
//! Licensed under the Apache-2.0 license

use super::*;
use chrono::{TimeZone, Utc};

fn deterministic_mapper() -> IdMapper {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    IdMapper::with_sources(
        Box::new(FixedClock::new(start).with_step(chrono::Duration::seconds(1))),
        Box::new(SeededSuffix::new(7)),
    )
}

#[test]
fn test_to_modern_id_is_stable() {
    let mut mapper = IdMapper::new();
    let first = mapper.to_modern_id(&LegacyId::Number(12), "article");
    let second = mapper.to_modern_id(&LegacyId::Number(12), "article");

    assert_eq!(first, second);
    assert_eq!(mapper.len(), 1);
    assert!(first.starts_with("article-12-"));
}

#[test]
fn test_mappings_are_scoped_per_resource_type() {
    let mut mapper = IdMapper::new();
    let article = mapper.to_modern_id(&LegacyId::Number(1), "article");
    let author = mapper.to_modern_id(&LegacyId::Number(1), "author");

    assert_ne!(article, author);
    assert_eq!(mapper.len(), 2);
    assert!(mapper.has_modern_id(&article, "article"));
    assert!(!mapper.has_modern_id(&article, "author"));
}

#[test]
fn test_reverse_lookup_returns_original_id() {
    let mut mapper = IdMapper::new();
    let numeric = mapper.to_modern_id(&LegacyId::Number(42), "api::article.article");
    let text = mapper.to_modern_id(&LegacyId::from("slug-9"), "api::article.article");

    assert_eq!(mapper.to_legacy_id(&numeric, "api::article.article"), LegacyId::Number(42));
    assert_eq!(
        mapper.to_legacy_id(&text, "api::article.article"),
        LegacyId::Text("slug-9".into())
    );
}

#[test]
fn test_numeric_and_text_ids_share_a_mapping() {
    let mut mapper = IdMapper::new();
    let from_number = mapper.to_modern_id(&LegacyId::Number(5), "tag");
    let from_text = mapper.to_modern_id(&LegacyId::from("5"), "tag");

    assert_eq!(from_number, from_text);
    assert_eq!(mapper.to_legacy_id(&from_text, "tag"), LegacyId::Number(5));
}

#[test]
fn test_unknown_modern_id_falls_back_to_digits() {
    let mapper = IdMapper::new();
    assert_eq!(mapper.to_legacy_id("article-77-abc", "article"), LegacyId::Number(77));
    assert_eq!(
        mapper.to_legacy_id("kx8hq2z", "article"),
        LegacyId::Number(8)
    );
    assert_eq!(
        mapper.to_legacy_id("no-digits-here", "article"),
        LegacyId::Text("no-digits-here".into())
    );
}

#[test]
fn test_digit_fallback_overflow_keeps_text() {
    let mapper = IdMapper::new();
    let id = "doc-99999999999999999999999";
    assert_eq!(mapper.to_legacy_id(id, "article"), LegacyId::Text(id.into()));
}

#[test]
fn test_injected_sources_make_synthesis_reproducible() {
    let mut a = deterministic_mapper();
    let mut b = deterministic_mapper();

    let ids_a: Vec<String> = (1..=3)
        .map(|i| a.to_modern_id(&LegacyId::Number(i), "article"))
        .collect();
    let ids_b: Vec<String> = (1..=3)
        .map(|i| b.to_modern_id(&LegacyId::Number(i), "article"))
        .collect();

    assert_eq!(ids_a, ids_b);
}

#[test]
fn test_stats_and_listing() {
    let mut mapper = deterministic_mapper();
    mapper.to_modern_id(&LegacyId::Number(1), "article");
    mapper.to_modern_id(&LegacyId::Number(2), "article");
    mapper.to_modern_id(&LegacyId::Number(1), "author");

    let stats = mapper.stats();
    assert_eq!(stats.total_mappings, 3);
    assert_eq!(stats.resource_types, vec!["article".to_string(), "author".to_string()]);
    assert_eq!(
        stats.oldest,
        Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    );
    assert_eq!(
        stats.newest,
        Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 2).unwrap())
    );

    let articles = mapper.mappings_for("article");
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].legacy_id, LegacyId::Number(1));
    assert_eq!(articles[1].legacy_id, LegacyId::Number(2));
}

#[test]
fn test_empty_stats() {
    let mapper = IdMapper::new();
    let stats = mapper.stats();
    assert_eq!(stats, MappingStats::default());
    assert!(mapper.is_empty());
}

#[test]
fn test_clear_resource_type_keeps_indices_consistent() {
    let mut mapper = IdMapper::new();
    let article = mapper.to_modern_id(&LegacyId::Number(1), "article");
    let author = mapper.to_modern_id(&LegacyId::Number(1), "author");

    assert_eq!(mapper.clear_resource_type("article"), 1);
    assert_eq!(mapper.clear_resource_type("article"), 0);
    assert!(!mapper.has_mapping(&LegacyId::Number(1), "article"));
    assert!(!mapper.has_modern_id(&article, "article"));
    assert!(mapper.has_modern_id(&author, "author"));

    mapper.clear();
    assert!(mapper.is_empty());
    assert!(!mapper.has_modern_id(&author, "author"));
}

#[test]
fn test_export_import_round_trip_restores_both_indices() {
    let mut source = IdMapper::new();
    let first = source.to_modern_id(&LegacyId::Number(10), "article");
    let second = source.to_modern_id(&LegacyId::from("abc"), "page");

    let json = source.export_json().unwrap();

    let mut target = IdMapper::new();
    target.to_modern_id(&LegacyId::Number(99), "stale");
    assert_eq!(target.import_json(&json).unwrap(), 2);

    assert!(!target.has_mapping(&LegacyId::Number(99), "stale"));
    assert_eq!(target.to_modern_id(&LegacyId::Number(10), "article"), first);
    assert_eq!(target.to_legacy_id(&first, "article"), LegacyId::Number(10));
    assert_eq!(target.to_legacy_id(&second, "page"), LegacyId::Text("abc".into()));
    assert_eq!(target.len(), 2);
}

#[test]
fn test_export_carries_composite_keys() {
    let mut mapper = IdMapper::new();
    mapper.to_modern_id(&LegacyId::Number(3), "article");

    let entries = mapper.export();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key, "article:3");

    let value = serde_json::to_value(&entries).unwrap();
    assert_eq!(value[0]["key"], "article:3");
    assert_eq!(value[0]["legacyId"], 3);
    assert_eq!(value[0]["resourceType"], "article");
    assert!(value[0]["modernId"].is_string());
    assert!(value[0]["createdAt"].is_string());
}

#[test]
fn test_import_conflicts_evict_from_both_indices() {
    let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let entry = |legacy: i64, modern: &str| MappingEntry {
        key: String::new(),
        mapping: IdMapping {
            legacy_id: LegacyId::Number(legacy),
            modern_id: modern.to_string(),
            resource_type: "article".to_string(),
            created_at,
        },
    };

    let mut mapper = IdMapper::new();
    mapper.import(vec![
        entry(1, "doc-a"),
        // same legacy id, new document id: doc-a must no longer resolve
        entry(1, "doc-b"),
        // same document id, new legacy id: legacy 1 must no longer resolve
        entry(2, "doc-b"),
    ]);

    assert_eq!(mapper.len(), 1);
    assert!(!mapper.has_modern_id("doc-a", "article"));
    assert!(!mapper.has_mapping(&LegacyId::Number(1), "article"));
    assert_eq!(mapper.to_legacy_id("doc-b", "article"), LegacyId::Number(2));
    assert_eq!(mapper.to_modern_id(&LegacyId::Number(2), "article"), "doc-b");
}

#[test]
fn test_import_corrupted_export_fails_without_touching_registry() {
    let mut mapper = IdMapper::new();
    let existing = mapper.to_modern_id(&LegacyId::Number(1), "article");

    let err = mapper.import_json("[{\"legacyId\": 1,").unwrap_err();
    match err {
        Error::MappingImport { message, .. } => assert!(!message.is_empty()),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(mapper.has_modern_id(&existing, "article"));
}

#[test]
fn test_slug_and_base36_helpers() {
    assert_eq!(slug("api::article.article", "item"), "api-article-article");
    assert_eq!(slug("::", "item"), "item");
    assert_eq!(slug(&"x".repeat(100), "item").len(), MAX_SLUG_LEN);
    assert_eq!(to_base36(0), "0");
    assert_eq!(to_base36(35), "z");
    assert_eq!(to_base36(36), "10");
}
