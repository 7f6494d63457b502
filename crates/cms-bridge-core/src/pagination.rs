//! Pagination block normalization
//!
//! Upstream `meta.pagination` blocks are untrusted: fields may be missing,
//! stringly typed or out of range. [`normalize_pagination`] produces a
//! clamped [`Pagination`]; [`fill_pagination_defaults`] only fills gaps and
//! is what the response transformer uses.

use crate::types::Pagination;
use serde_json::{Map, Value};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 25;
pub const DEFAULT_PAGE_COUNT: u64 = 1;
pub const DEFAULT_TOTAL: u64 = 0;

/// Largest page size a normalized block may carry
pub const MAX_PAGE_SIZE: u64 = 100;

const FIELDS: [(&str, u64); 4] = [
    ("page", DEFAULT_PAGE),
    ("pageSize", DEFAULT_PAGE_SIZE),
    ("pageCount", DEFAULT_PAGE_COUNT),
    ("total", DEFAULT_TOTAL),
];

/// Coerce and clamp a pagination block
///
/// Numbers and numeric strings are truncated to integers; anything else
/// counts as missing and takes the default. `page` and `pageCount` are at
/// least 1, `pageSize` is within `1..=100` and `total` is never negative.
pub fn normalize_pagination(pagination: &Value) -> Pagination {
    let field = |name: &str| pagination.get(name).and_then(coerce_integer);

    Pagination {
        page: clamp(field("page"), DEFAULT_PAGE, 1, i64::MAX),
        page_size: clamp(field("pageSize"), DEFAULT_PAGE_SIZE, 1, MAX_PAGE_SIZE as i64),
        page_count: clamp(field("pageCount"), DEFAULT_PAGE_COUNT, 1, i64::MAX),
        total: clamp(field("total"), DEFAULT_TOTAL, 0, i64::MAX),
    }
}

/// Fill missing or non-numeric pagination fields with their defaults
///
/// Present numeric values and any extra keys are kept as they are.
pub fn fill_pagination_defaults(pagination: &Value) -> Value {
    let mut filled = match pagination {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    for (name, default) in FIELDS {
        if !filled.get(name).is_some_and(Value::is_number) {
            filled.insert(name.to_string(), Value::from(default));
        }
    }

    Value::Object(filled)
}

fn coerce_integer(value: &Value) -> Option<i64> {
    let number = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => return Some(i),
            None => n.as_f64()?,
        },
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    // saturating float to int cast
    number.is_finite().then(|| number.trunc() as i64)
}

fn clamp(value: Option<i64>, default: u64, min: i64, max: i64) -> u64 {
    match value {
        Some(value) => value.clamp(min, max) as u64,
        None => default,
    }
}
