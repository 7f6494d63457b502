//! Batch, response envelope and metrics-wrapped transformations
//!
//! Copyright (c) 2025 cms-bridge contributors
//! Licensed under the Apache-2.0 license

use super::pipeline::{is_response_envelope, DataTransformer};
use super::types::{TransformMetrics, TransformOptions, WalkStats};
use crate::error::{Error, Result};
use crate::pagination::fill_pagination_defaults;
use crate::types::Format;
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::info;

impl<'m> DataTransformer<'m> {
    /// Transform every element of an array independently
    pub fn batch_transform(
        &mut self,
        items: &Value,
        from: Format,
        to: Format,
        options: &TransformOptions,
    ) -> Result<Vec<Value>> {
        let Value::Array(items) = items else {
            return Err(Error::invalid_argument(
                "items",
                "batch transform expects an array of items",
            ));
        };

        items
            .iter()
            .map(|item| Ok(self.transform(item, from, to, options)?.into_owned()))
            .collect()
    }

    /// Transform a response envelope
    ///
    /// `data` is transformed; a `meta.pagination` block gets defaults for
    /// missing fields. Every other key is carried over untouched.
    pub fn transform_response(
        &mut self,
        envelope: &Value,
        from: Format,
        to: Format,
        options: &TransformOptions,
    ) -> Result<Value> {
        let Value::Object(envelope) = envelope else {
            return Err(Error::invalid_argument(
                "envelope",
                "response envelope must be an object",
            ));
        };

        let (result, _) = self.convert_envelope(envelope, from, to, options)?;
        Ok(result)
    }

    /// Envelope conversion shared by the plain, response and metrics paths
    pub(crate) fn convert_envelope(
        &mut self,
        envelope: &Map<String, Value>,
        from: Format,
        to: Format,
        options: &TransformOptions,
    ) -> Result<(Value, WalkStats)> {
        let mut result = envelope.clone();
        let mut stats = WalkStats::default();

        if let Some(data) = envelope.get("data") {
            let (data, walked) = self.convert_value(data, from, to, options)?;
            result.insert("data".to_string(), data);
            stats = walked;
        }

        if let Some(Value::Object(meta)) = result.get_mut("meta") {
            if let Some(pagination) = meta.get("pagination") {
                let filled = fill_pagination_defaults(pagination);
                meta.insert("pagination".to_string(), filled);
            }
        }

        Ok((Value::Object(result), stats))
    }

    /// [`transform`](Self::transform) plus timing and traversal counters
    ///
    /// The returned value is exactly what `transform` would have produced.
    pub fn transform_with_metrics(
        &mut self,
        data: &Value,
        from: Format,
        to: Format,
        options: &TransformOptions,
    ) -> Result<(Value, TransformMetrics)> {
        let started = Instant::now();

        let (value, stats, items) = match data {
            _ if from == to => (data.clone(), WalkStats::default(), item_count(data)),
            Value::Object(envelope) if is_response_envelope(envelope) => {
                let (value, stats) = self.convert_envelope(envelope, from, to, options)?;
                let items = envelope.get("data").map_or(0, item_count);
                (value, stats, items)
            }
            _ => {
                let (value, stats) = self.convert_value(data, from, to, options)?;
                (value, stats, item_count(data))
            }
        };
        let metrics = TransformMetrics::new(started.elapsed(), items, stats);

        info!(
            %from,
            %to,
            items,
            duration_ms = metrics.duration_ms(),
            avg_item_ms = metrics.avg_item_duration_ms(),
            converted = metrics.converted_items,
            "Transform completed"
        );

        Ok((value, metrics))
    }
}

fn item_count(data: &Value) -> usize {
    match data {
        Value::Array(items) => items.len(),
        _ => 1,
    }
}
