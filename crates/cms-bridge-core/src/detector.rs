//! Format detection for arbitrary payloads
//!
//! Detection is total: any JSON value, including `null`, empty containers and
//! deeply nested documents, yields a [`Format`]. Only the top level of the
//! payload is inspected, so cost is linear in the number of items.

use crate::shape::{is_envelope, is_legacy_like, is_modern_like};
use crate::types::{Format, FormatStatistics};
use serde_json::Value;

/// Classify a single item, an array of items or a response envelope
///
/// An object is treated as a one-element array. An envelope (an object with a
/// `data` key and no item markers) is classified by its `data`.
pub fn detect_format(value: &Value) -> Format {
    format_statistics(value).format
}

/// Count legacy-like, modern-like and unrecognized items and aggregate them
///
/// Items carrying both markers count towards both categories, which makes a
/// payload made only of such items `Mixed`.
pub fn format_statistics(value: &Value) -> FormatStatistics {
    let items = top_level_items(value);

    let mut stats = FormatStatistics {
        total: items.len(),
        legacy: 0,
        modern: 0,
        unknown: 0,
        format: Format::Unknown,
    };

    for item in items {
        let Some(map) = item.as_object() else {
            stats.unknown += 1;
            continue;
        };

        let legacy = is_legacy_like(map);
        let modern = is_modern_like(map);

        if legacy {
            stats.legacy += 1;
        }
        if modern {
            stats.modern += 1;
        }
        if !legacy && !modern {
            stats.unknown += 1;
        }
    }

    stats.format = aggregate(stats.legacy, stats.modern);
    stats
}

fn aggregate(legacy: usize, modern: usize) -> Format {
    match (legacy > 0, modern > 0) {
        (true, true) => Format::Mixed,
        (true, false) => Format::Legacy,
        (false, true) => Format::Modern,
        (false, false) => Format::Unknown,
    }
}

fn top_level_items(value: &Value) -> Vec<&Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) if is_envelope(map) => match map.get("data") {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(data) => vec![data],
        },
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_single_items() {
        assert_eq!(detect_format(&json!({"id": 1, "attributes": {}})), Format::Legacy);
        assert_eq!(detect_format(&json!({"documentId": "x1", "title": "t"})), Format::Modern);
        assert_eq!(detect_format(&json!({"title": "t"})), Format::Unknown);
    }

    #[test]
    fn test_detect_arrays() {
        let legacy = json!([
            {"id": 1, "attributes": {"title": "a"}},
            {"id": 2, "attributes": {"title": "b"}}
        ]);
        assert_eq!(detect_format(&legacy), Format::Legacy);

        let mixed = json!([
            {"id": 1, "attributes": {"title": "a"}},
            {"documentId": "abc", "title": "b"}
        ]);
        assert_eq!(detect_format(&mixed), Format::Mixed);
    }

    #[test]
    fn test_unknown_items_do_not_change_aggregate() {
        let value = json!([{"documentId": "a"}, {"title": "no markers"}, 42]);
        let stats = format_statistics(&value);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.modern, 1);
        assert_eq!(stats.unknown, 2);
        assert_eq!(stats.format, Format::Modern);
    }

    #[test]
    fn test_item_with_both_markers_is_mixed() {
        let value = json!({"id": 1, "attributes": {}, "documentId": "a"});
        let stats = format_statistics(&value);
        assert_eq!(stats.legacy, 1);
        assert_eq!(stats.modern, 1);
        assert_eq!(stats.format, Format::Mixed);
    }

    #[test]
    fn test_empty_inputs_are_unknown() {
        for value in [Value::Null, json!({}), json!([]), json!(""), json!(0), json!(true)] {
            assert_eq!(detect_format(&value), Format::Unknown, "input: {}", value);
        }
        assert_eq!(format_statistics(&Value::Null).total, 0);
    }

    #[test]
    fn test_envelope_is_unwrapped() {
        let envelope = json!({
            "data": [{"documentId": "a"}, {"documentId": "b"}],
            "meta": {"pagination": {"page": 1, "pageSize": 25, "pageCount": 1, "total": 2}}
        });
        let stats = format_statistics(&envelope);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.format, Format::Modern);

        assert_eq!(detect_format(&json!({"data": {"id": 3, "attributes": {}}})), Format::Legacy);
        assert_eq!(detect_format(&json!({"data": null})), Format::Unknown);
    }
}
