//! Data transformation between the legacy and modern payload shapes
//!
//! The transformer walks a payload once, classifying every object with
//! [`crate::shape::classify_object`] and converting items, relations and
//! media according to the target format:
//!
//! - legacy items `{ id, attributes }` become `{ documentId, id?, ...attributes }`
//! - relations `{ data: X }` are unwrapped to `X`, and wrapped back the other way
//! - media objects map their identifiers under the `media` resource type
//!
//! Two guards keep the walk bounded. Past [`MAX_TRANSFORM_DEPTH`] property
//! levels a branch is emitted unconverted, and a node reached again while
//! it is still being converted becomes `{"circularRef": true}`. Neither
//! guard produces an error; both log a warning.
//!
//! # Module Organization
//!
//! - [`types`] - options and metrics
//! - [`pipeline`] - `DataTransformer` and single-payload entry points
//! - `engine` - the recursive walk
//! - `response` - batch, response envelope and metrics variants
//!
//! # Example
//!
//! ```
//! use cms_bridge_core::{DataTransformer, Format, IdMapper, TransformOptions};
//! use serde_json::json;
//!
//! let mut mapper = IdMapper::new();
//! let mut transformer = DataTransformer::new(&mut mapper);
//!
//! let legacy = json!({"id": 1, "attributes": {"title": "Hello"}});
//! let options = TransformOptions::for_content_type("article");
//! let modern = transformer
//!     .transform(&legacy, Format::Legacy, Format::Modern, &options)
//!     .unwrap();
//!
//! assert_eq!(modern["title"], "Hello");
//! assert!(modern["documentId"].as_str().unwrap().starts_with("article-1-"));
//! ```
//!
//! Copyright (c) 2025 cms-bridge contributors
//! Licensed under the Apache-2.0 license

pub mod pipeline;
pub mod types;

mod engine;
mod response;


pub use crate::graph::CIRCULAR_REF_KEY;
pub use pipeline::DataTransformer;
pub use types::{TransformMetrics, TransformOptions, DEFAULT_CONTENT_TYPE};

/// Property depth past which branches are left unconverted
pub const MAX_TRANSFORM_DEPTH: usize = 10;
