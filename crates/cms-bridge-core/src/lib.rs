//! cms-bridge Core - shape bridge between legacy (v4) and modern (v5) CMS payloads
//!
//! This crate detects, validates and converts JSON payloads between the two
//! item conventions of a headless CMS:
//!
//! - legacy items `{ "id": 1, "attributes": { ... } }` with relations wrapped as `{ "data": ... }`
//! - modern items `{ "documentId": "...", ... }` with relations inlined
//!
//! # Main Components
//!
//! - **Format Detection**: classify a payload as legacy, modern, mixed or unknown
//! - **Validation**: structural checks per format and attribute checks against a schema
//! - **Identity Mapping**: a bidirectional registry between legacy ids and document ids
//! - **Transformation**: depth- and cycle-guarded conversion of items, relations and media
//! - **Pagination**: normalization of untrusted `meta.pagination` blocks
//!
//! Malformed payloads never produce errors; they produce reports. [`Error`]
//! is reserved for caller contract violations and corrupted mapping exports.
//!
//! # Example
//!
//! ```
//! use cms_bridge_core::{detect_format, transform, Format, IdMapper, TransformOptions};
//! use serde_json::json;
//!
//! fn example() -> cms_bridge_core::Result<()> {
//!     let mut mapper = IdMapper::new();
//!     let legacy = json!([{"id": 3, "attributes": {"title": "Hello"}}]);
//!     assert_eq!(detect_format(&legacy), Format::Legacy);
//!
//!     let options = TransformOptions::for_content_type("article");
//!     let modern = transform(&mut mapper, &legacy, Format::Legacy, Format::Modern, &options)?;
//!     assert_eq!(detect_format(&modern), Format::Modern);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod detector;
pub mod error;
pub mod graph;
pub mod id_mapper;
pub mod pagination;
pub mod shape;
pub mod transformer;
pub mod types;
pub mod validator;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use types::{Format, FormatStatistics, LegacyId, Pagination};

pub use detector::{detect_format, format_statistics};
pub use graph::{DocumentGraph, Node, NodeId, DEFAULT_NODE_BUDGET};
pub use id_mapper::{
    Clock, FixedClock, IdMapper, IdMapping, MappingEntry, MappingStats, RandomSuffix,
    SeededSuffix, SuffixSource, SystemClock,
};
pub use pagination::{fill_pagination_defaults, normalize_pagination};
pub use shape::{classify, Shape};
pub use transformer::{
    DataTransformer, TransformMetrics, TransformOptions, CIRCULAR_REF_KEY, DEFAULT_CONTENT_TYPE,
    MAX_TRANSFORM_DEPTH,
};
pub use validator::{
    validate_against_schema, validate_format, validate_response, validation_report,
    AttributeSchema, FieldSchema, FieldType, SchemaOptions, StructuralValidator,
    ValidationOptions, ValidationReport,
};

use serde_json::Value;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Transform `data` with a one-off [`DataTransformer`] over `mapper`
///
/// Unlike [`DataTransformer::transform`] this always returns an owned value.
pub fn transform(
    mapper: &mut IdMapper,
    data: &Value,
    from: Format,
    to: Format,
    options: &TransformOptions,
) -> Result<Value> {
    DataTransformer::new(mapper)
        .transform(data, from, to, options)
        .map(|value| value.into_owned())
}

/// Transform every item of an array; fails on anything but an array
pub fn batch_transform(
    mapper: &mut IdMapper,
    items: &Value,
    from: Format,
    to: Format,
    options: &TransformOptions,
) -> Result<Vec<Value>> {
    DataTransformer::new(mapper).batch_transform(items, from, to, options)
}

/// Transform a response envelope's `data` and fill its pagination defaults
pub fn transform_response(
    mapper: &mut IdMapper,
    envelope: &Value,
    from: Format,
    to: Format,
    options: &TransformOptions,
) -> Result<Value> {
    DataTransformer::new(mapper).transform_response(envelope, from, to, options)
}
