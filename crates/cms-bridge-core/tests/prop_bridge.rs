//! Property-based tests for the bridge
//!
//! These tests verify invariants that should hold for arbitrary payloads:
//! detection never fails, identity mappings invert, and flat legacy items
//! survive a round trip.

use cms_bridge_core::{
    detect_format, format_statistics, transform, validation_report, DataTransformer, Format,
    IdMapper, LegacyId, TransformOptions, ValidationOptions,
};
use proptest::prelude::*;
use serde_json::{Map, Value};

// Strategy functions for property testing

/// Strategy for arbitrary JSON values of bounded size
fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
    ];

    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map(key_strategy(), inner, 0..6)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

/// Keys biased towards the fields the detector looks at
fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("id".to_string()),
        Just("documentId".to_string()),
        Just("attributes".to_string()),
        Just("data".to_string()),
        Just("url".to_string()),
        "[a-z]{1,8}",
    ]
}

/// Strategy for legacy ids
fn legacy_id_strategy() -> impl Strategy<Value = LegacyId> {
    prop_oneof![
        (0i64..1_000_000).prop_map(LegacyId::Number),
        "[a-z][a-z0-9_-]{0,15}".prop_map(LegacyId::Text),
    ]
}

/// Scalar attribute values that survive both directions unchanged
fn attribute_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[a-zA-Z0-9 .,]{0,24}".prop_map(Value::String),
        prop::collection::vec("[a-z]{1,6}".prop_map(Value::String), 0..4).prop_map(Value::Array),
    ]
}

/// Legacy items without relations or media fields
fn legacy_item_strategy() -> impl Strategy<Value = Value> {
    (
        1i64..100_000,
        prop::collection::btree_map("[a-z]{2,10}", attribute_strategy(), 0..8),
    )
        .prop_filter("non-empty arrays only", |(_, attributes)| {
            attributes
                .values()
                .all(|value| value.as_array().map_or(true, |items| !items.is_empty()))
        })
        .prop_map(|(id, attributes)| {
            let mut item = Map::new();
            item.insert("id".to_string(), Value::from(id));
            item.insert(
                "attributes".to_string(),
                Value::Object(attributes.into_iter().filter(|(k, _)| !is_reserved(k)).collect()),
            );
            Value::Object(item)
        })
}

fn is_reserved(key: &str) -> bool {
    matches!(key, "id" | "documentId" | "attributes" | "data" | "url" | "mime" | "hash" | "ext" | "size")
}

proptest! {
    #[test]
    fn prop_detection_is_total(value in json_strategy()) {
        let stats = format_statistics(&value);
        prop_assert_eq!(stats.format, detect_format(&value));
        prop_assert!(stats.legacy <= stats.total && stats.modern <= stats.total);
        prop_assert!(stats.unknown <= stats.total);
    }

    #[test]
    fn prop_validation_never_panics(value in json_strategy(), strict in any::<bool>()) {
        let options = ValidationOptions { strict, ..ValidationOptions::default() };
        for format in [Format::Legacy, Format::Modern, Format::Mixed] {
            let report = validation_report(&value, format, &options);
            prop_assert_eq!(report.is_valid, report.errors.is_empty());
            prop_assert_eq!(report.valid_items + report.invalid_items, report.total_items);
        }
    }

    #[test]
    fn prop_mapping_is_bijective(
        ids in prop::collection::vec(legacy_id_strategy(), 1..20),
        resource_type in "[a-z]{1,10}",
    ) {
        let mut mapper = IdMapper::new();
        for id in &ids {
            let modern = mapper.to_modern_id(id, &resource_type);
            prop_assert_eq!(&mapper.to_modern_id(id, &resource_type), &modern);
            prop_assert_eq!(&mapper.to_legacy_id(&modern, &resource_type), id);
        }
    }

    #[test]
    fn prop_flat_round_trip(item in legacy_item_strategy()) {
        let mut mapper = IdMapper::new();
        let options = TransformOptions::for_content_type("article");

        let modern = transform(&mut mapper, &item, Format::Legacy, Format::Modern, &options).unwrap();
        let back = transform(&mut mapper, &modern, Format::Modern, Format::Legacy, &options).unwrap();

        prop_assert_eq!(back, item);
    }

    #[test]
    fn prop_transform_never_fails_on_garbage(value in json_strategy(), to_modern in any::<bool>()) {
        let mut mapper = IdMapper::new();
        let (from, to) = if to_modern {
            (Format::Legacy, Format::Modern)
        } else {
            (Format::Modern, Format::Legacy)
        };

        let result = DataTransformer::new(&mut mapper)
            .transform(&value, from, to, &TransformOptions::default());
        prop_assert!(result.is_ok());
    }
}
