//! Transformation options and metrics
//!
//! Copyright (c) 2025 cms-bridge contributors
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Content type used for identifier mapping when none is given
pub const DEFAULT_CONTENT_TYPE: &str = "default";

/// Per-call transformation options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransformOptions {
    /// Resource type scoping identifier mappings of converted items
    pub content_type: String,
    /// Keep the legacy `id` next to `documentId` on modern output
    pub preserve_original_id: bool,
    /// Validate the output against the target format and log when invalid
    pub validate_result: bool,
    /// Depth the walk starts at
    pub depth: usize,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            preserve_original_id: true,
            validate_result: false,
            depth: 0,
        }
    }
}

impl TransformOptions {
    pub fn for_content_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            ..Self::default()
        }
    }
}

/// Counters gathered while walking one payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct WalkStats {
    pub converted_items: usize,
    pub circular_refs: usize,
    pub depth_cutoffs: usize,
}

/// Timing and counters of a metrics-wrapped transformation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformMetrics {
    /// Wall-clock duration of the whole call
    pub duration: Duration,
    /// Top-level items in the payload (array length, otherwise 1)
    pub items: usize,
    /// `duration` divided by `items`
    pub avg_item_duration: Duration,
    /// Items converted between shapes, nested ones included
    pub converted_items: usize,
    /// Branches replaced by a circular reference marker
    pub circular_refs: usize,
    /// Branches left unconverted by the depth guard
    pub depth_cutoffs: usize,
}

impl TransformMetrics {
    pub(crate) fn new(duration: Duration, items: usize, stats: WalkStats) -> Self {
        let avg_item_duration = match u32::try_from(items) {
            Ok(0) => Duration::ZERO,
            Ok(count) => duration / count,
            Err(_) => Duration::from_secs_f64(duration.as_secs_f64() / items as f64),
        };

        Self {
            duration,
            items,
            avg_item_duration,
            converted_items: stats.converted_items,
            circular_refs: stats.circular_refs,
            depth_cutoffs: stats.depth_cutoffs,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }

    pub fn avg_item_duration_ms(&self) -> f64 {
        self.avg_item_duration.as_secs_f64() * 1000.0
    }
}
