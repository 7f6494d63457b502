//! Core data types shared by the detector, validator and transformer
//!
//! Payloads themselves stay untyped (`serde_json::Value`); the types here
//! describe formats, identifiers and the small fixed-shape blocks that the
//! engine produces.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Item shape convention of a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// `{ id, attributes: {...} }` items with wrapped relations (v4)
    Legacy,
    /// `{ documentId, ...fields }` items with unwrapped relations (v5)
    Modern,
    /// Both shapes present in one payload
    Mixed,
    /// Nothing recognizable
    Unknown,
}

impl Format {
    /// Whether the format names a concrete shape that items can be converted to
    pub fn is_concrete(self) -> bool {
        matches!(self, Format::Legacy | Format::Modern)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Format::Legacy => "legacy",
            Format::Modern => "modern",
            Format::Mixed => "mixed",
            Format::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" | "v4" => Ok(Format::Legacy),
            "modern" | "v5" => Ok(Format::Modern),
            "mixed" => Ok(Format::Mixed),
            "unknown" => Ok(Format::Unknown),
            other => Err(crate::Error::invalid_argument(
                "format",
                format!("unrecognized format '{}'", other),
            )),
        }
    }
}

/// Identifier of an item in the legacy shape
///
/// Legacy ids are numeric in practice, but string ids are accepted and kept
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LegacyId {
    Number(i64),
    Text(String),
}

impl LegacyId {
    /// Read a legacy id from a JSON `id` value
    ///
    /// Returns `None` for `null`. Integral numbers become `Number`; anything
    /// else keeps its textual form.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => LegacyId::Number(i),
                None => LegacyId::Text(n.to_string()),
            }),
            Value::String(s) => Some(LegacyId::Text(s.clone())),
            other => Some(LegacyId::Text(other.to_string())),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            LegacyId::Number(n) => Value::from(*n),
            LegacyId::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for LegacyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegacyId::Number(n) => write!(f, "{}", n),
            LegacyId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for LegacyId {
    fn from(id: i64) -> Self {
        LegacyId::Number(id)
    }
}

impl From<&str> for LegacyId {
    fn from(id: &str) -> Self {
        LegacyId::Text(id.to_string())
    }
}

impl From<String> for LegacyId {
    fn from(id: String) -> Self {
        LegacyId::Text(id)
    }
}

/// Pagination block of a response envelope's `meta`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
    pub page_count: u64,
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: crate::pagination::DEFAULT_PAGE,
            page_size: crate::pagination::DEFAULT_PAGE_SIZE,
            page_count: crate::pagination::DEFAULT_PAGE_COUNT,
            total: crate::pagination::DEFAULT_TOTAL,
        }
    }
}

/// Per-category item counts produced by the format detector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatStatistics {
    /// Number of items inspected
    pub total: usize,
    /// Items carrying both `id` and `attributes`
    pub legacy: usize,
    /// Items carrying `documentId`
    pub modern: usize,
    /// Items matching neither rule
    pub unknown: usize,
    /// Aggregate classification
    pub format: Format,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_parse_and_display() {
        assert_eq!("Legacy".parse::<Format>().unwrap(), Format::Legacy);
        assert_eq!("v5".parse::<Format>().unwrap(), Format::Modern);
        assert!("v6".parse::<Format>().is_err());
        assert_eq!(Format::Mixed.to_string(), "mixed");
        assert_eq!(serde_json::to_value(Format::Unknown).unwrap(), json!("unknown"));
    }

    #[test]
    fn test_legacy_id_from_value() {
        assert_eq!(LegacyId::from_value(&json!(7)), Some(LegacyId::Number(7)));
        assert_eq!(LegacyId::from_value(&json!("abc")), Some(LegacyId::Text("abc".into())));
        assert_eq!(LegacyId::from_value(&json!(1.5)), Some(LegacyId::Text("1.5".into())));
        assert_eq!(LegacyId::from_value(&Value::Null), None);
    }

    #[test]
    fn test_legacy_id_serde_is_untagged() {
        let ids: Vec<LegacyId> = serde_json::from_value(json!([3, "x"])).unwrap();
        assert_eq!(ids, vec![LegacyId::Number(3), LegacyId::Text("x".into())]);
        assert_eq!(LegacyId::Number(3).to_value(), json!(3));
    }

    #[test]
    fn test_pagination_serializes_camel_case() {
        let value = serde_json::to_value(Pagination::default()).unwrap();
        assert_eq!(value, json!({"page": 1, "pageSize": 25, "pageCount": 1, "total": 0}));
    }
}
