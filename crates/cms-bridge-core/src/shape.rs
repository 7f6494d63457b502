//! Structural recognizers for items, relations and media objects
//!
//! Every component that branches on payload shape goes through [`classify`]
//! (or [`classify_object`] for non-`Value` object representations) so the
//! key-presence rules live in one place.

use serde_json::{Map, Value};

/// Fields whose presence marks an object as an uploaded file
pub const MEDIA_FIELDS: [&str; 5] = ["url", "mime", "hash", "ext", "size"];

/// Resource type used for identifier mapping of media objects
pub const MEDIA_RESOURCE_TYPE: &str = "media";

/// Shape of a single JSON value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `{ id, attributes: {...} }`
    LegacyItem,
    /// `{ id, ...fields }` without `attributes`
    FlatLegacyItem,
    /// `{ documentId, ...fields }`
    ModernItem,
    /// `{ data: item | item[] | null }`
    LegacyRelation,
    /// A collection of items in unwrapped form
    ModernRelation,
    /// An uploaded file, in either format
    MediaObject,
    /// Scalars and objects with no item markers
    Unknown,
}

/// Key-presence view over an object
///
/// Implemented for `serde_json` maps and for graph objects so both
/// representations share the same classification rules.
pub trait ShapeProbe: Sized {
    /// Whether the key is present, regardless of its value
    fn has(&self, key: &str) -> bool;

    /// The value under `key` when it is itself an object
    fn object_field(&self, key: &str) -> Option<Self>;
}

impl<'a> ShapeProbe for &'a Map<String, Value> {
    fn has(&self, key: &str) -> bool {
        self.contains_key(key)
    }

    fn object_field(&self, key: &str) -> Option<Self> {
        let map: &'a Map<String, Value> = *self;
        map.get(key).and_then(Value::as_object)
    }
}

/// Classify an arbitrary JSON value
pub fn classify(value: &Value) -> Shape {
    match value {
        Value::Object(map) => classify_object(map),
        Value::Array(_) => Shape::ModernRelation,
        _ => Shape::Unknown,
    }
}

/// Classify an object
///
/// Precedence: media, legacy item, modern item, legacy relation, flat legacy
/// item. A legacy item requires `attributes` to be an object; an `id` next to
/// a non-object `attributes` is treated as a flat item.
pub fn classify_object<P: ShapeProbe>(object: P) -> Shape {
    if is_media(&object) {
        Shape::MediaObject
    } else if object.has("id") && object.object_field("attributes").is_some() {
        Shape::LegacyItem
    } else if object.has("documentId") {
        Shape::ModernItem
    } else if object.has("data") && !object.has("id") {
        Shape::LegacyRelation
    } else if object.has("id") {
        Shape::FlatLegacyItem
    } else {
        Shape::Unknown
    }
}

/// Media objects carry an identifier plus at least one file field, either
/// directly or under `attributes`
pub fn is_media<P: ShapeProbe>(object: &P) -> bool {
    if !(object.has("id") || object.has("documentId")) {
        return false;
    }

    if MEDIA_FIELDS.iter().any(|field| object.has(field)) {
        return true;
    }

    object
        .object_field("attributes")
        .map(|attributes| MEDIA_FIELDS.iter().any(|field| attributes.has(field)))
        .unwrap_or(false)
}

/// Detector rule: an object is legacy-like iff it has `id` and `attributes`
pub fn is_legacy_like(map: &Map<String, Value>) -> bool {
    map.contains_key("id") && map.contains_key("attributes")
}

/// Detector rule: an object is modern-like iff it has `documentId`
pub fn is_modern_like(map: &Map<String, Value>) -> bool {
    map.contains_key("documentId")
}

/// Whether an object looks like a response envelope rather than an item
pub fn is_envelope(map: &Map<String, Value>) -> bool {
    map.contains_key("data") && !is_legacy_like(map) && !is_modern_like(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_items() {
        assert_eq!(classify(&json!({"id": 1, "attributes": {"title": "a"}})), Shape::LegacyItem);
        assert_eq!(classify(&json!({"documentId": "abc", "title": "a"})), Shape::ModernItem);
        assert_eq!(classify(&json!({"id": 1, "title": "a"})), Shape::FlatLegacyItem);
        assert_eq!(classify(&json!({"id": 1, "attributes": "oops"})), Shape::FlatLegacyItem);
    }

    #[test]
    fn test_classify_relations() {
        assert_eq!(classify(&json!({"data": null})), Shape::LegacyRelation);
        assert_eq!(classify(&json!({"data": [{"id": 1, "attributes": {}}]})), Shape::LegacyRelation);
        assert_eq!(classify(&json!([{"documentId": "a"}])), Shape::ModernRelation);
    }

    #[test]
    fn test_classify_media() {
        assert_eq!(
            classify(&json!({"id": 4, "url": "/uploads/a.png", "mime": "image/png"})),
            Shape::MediaObject
        );
        assert_eq!(
            classify(&json!({"id": 4, "attributes": {"url": "/uploads/a.png"}})),
            Shape::MediaObject
        );
        assert_eq!(
            classify(&json!({"documentId": "f1", "hash": "a_1"})),
            Shape::MediaObject
        );
        // file fields without an identifier are just an object
        assert_eq!(classify(&json!({"url": "/x", "size": 3})), Shape::Unknown);
    }

    #[test]
    fn test_classify_scalars_and_plain_objects() {
        assert_eq!(classify(&Value::Null), Shape::Unknown);
        assert_eq!(classify(&json!("text")), Shape::Unknown);
        assert_eq!(classify(&json!({"title": "x"})), Shape::Unknown);
    }

    #[test]
    fn test_envelope_detection() {
        assert!(is_envelope(json!({"data": [], "meta": {}}).as_object().unwrap()));
        assert!(!is_envelope(json!({"documentId": "a", "data": 1}).as_object().unwrap()));
    }
}
