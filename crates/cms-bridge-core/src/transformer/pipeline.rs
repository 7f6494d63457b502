//! Data transformer entry points
//!
//! Copyright (c) 2025 cms-bridge contributors
//! Licensed under the Apache-2.0 license

use super::engine::{Direction, Walk};
use super::types::{TransformOptions, WalkStats};
use super::MAX_TRANSFORM_DEPTH;
use crate::error::{Error, Result};
use crate::graph::{DocumentGraph, NodeId};
use crate::id_mapper::IdMapper;
use crate::shape::is_envelope;
use crate::types::Format;
use crate::validator::{validation_report, ValidationOptions};
use serde_json::{Map, Value};
use std::borrow::Cow;
use tracing::{debug, warn};

/// Converts payloads between the legacy and modern shapes
///
/// Identifiers are translated through the borrowed [`IdMapper`], so every
/// transformer sharing a mapper sees the same mappings. One call is one
/// traversal; no state other than the mapper outlives it.
#[derive(Debug)]
pub struct DataTransformer<'m> {
    mapper: &'m mut IdMapper,
    max_depth: usize,
}

impl<'m> DataTransformer<'m> {
    pub fn new(mapper: &'m mut IdMapper) -> Self {
        Self {
            mapper,
            max_depth: MAX_TRANSFORM_DEPTH,
        }
    }

    /// Override the depth past which branches are left unconverted
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn mapper(&self) -> &IdMapper {
        &*self.mapper
    }

    pub fn mapper_mut(&mut self) -> &mut IdMapper {
        &mut *self.mapper
    }

    /// Convert `data` from `from` to `to`
    ///
    /// When `from == to` the input is returned borrowed and untouched.
    /// Otherwise conversion is driven by the shape of each object, so
    /// `mixed` and `unknown` sources are accepted; the target must be
    /// `legacy` or `modern`.
    ///
    /// A top-level response envelope (`{ data, meta, .. }`) is handled as
    /// [`transform_response`](Self::transform_response) would, so `meta`
    /// survives and `data` is not mistaken for a relation wrapper.
    pub fn transform<'a>(
        &mut self,
        data: &'a Value,
        from: Format,
        to: Format,
        options: &TransformOptions,
    ) -> Result<Cow<'a, Value>> {
        if from == to {
            return Ok(Cow::Borrowed(data));
        }

        let (value, _) = match data {
            Value::Object(envelope) if is_response_envelope(envelope) => {
                debug!("Transforming top-level response envelope");
                self.convert_envelope(envelope, from, to, options)?
            }
            _ => self.convert_value(data, from, to, options)?,
        };
        Ok(Cow::Owned(value))
    }

    /// Convert the subtree below `node` of a host-built graph
    ///
    /// Nodes linked from their own descendants are emitted as
    /// `{"circularRef": true}` at the point where they recur. Shared nodes
    /// are converted at every reference; a graph that expands past its node
    /// budget fails with [`Error::NodeBudgetExceeded`].
    pub fn transform_graph(
        &mut self,
        graph: &DocumentGraph,
        node: NodeId,
        from: Format,
        to: Format,
        options: &TransformOptions,
    ) -> Result<Value> {
        if from == to {
            return graph.materialize(node);
        }
        if graph.get(node).is_none() {
            return Err(Error::invalid_argument(
                "node",
                format!("node {} does not belong to this graph", node.index()),
            ));
        }

        let (value, _) = self.convert(graph, node, from, to, options)?;
        Ok(value)
    }

    /// One traversal of a plain value; `from == to` yields a copy
    pub(crate) fn convert_value(
        &mut self,
        data: &Value,
        from: Format,
        to: Format,
        options: &TransformOptions,
    ) -> Result<(Value, WalkStats)> {
        if from == to {
            return Ok((data.clone(), WalkStats::default()));
        }

        let graph = DocumentGraph::from_value(data);
        self.convert(&graph, graph_root(&graph)?, from, to, options)
    }

    /// One full traversal, returning the converted value and its counters
    pub(crate) fn convert(
        &mut self,
        graph: &DocumentGraph,
        node: NodeId,
        from: Format,
        to: Format,
        options: &TransformOptions,
    ) -> Result<(Value, WalkStats)> {
        let direction = match to {
            Format::Modern => Direction::ToModern,
            Format::Legacy => Direction::ToLegacy,
            other => {
                return Err(Error::invalid_argument(
                    "to",
                    format!("cannot transform {} data to {}", from, other),
                ))
            }
        };

        let mut walk = Walk::new(graph, &mut *self.mapper, options, direction, self.max_depth);
        let value = walk.run(node, options.depth);
        if let Some(err) = walk.take_failure() {
            return Err(err);
        }
        let stats = walk.stats;

        debug!(
            %from,
            %to,
            content_type = %options.content_type,
            converted = stats.converted_items,
            circular_refs = stats.circular_refs,
            depth_cutoffs = stats.depth_cutoffs,
            "Transformed payload"
        );

        if options.validate_result {
            let report = validation_report(&value, to, &ValidationOptions::default());
            if !report.is_valid {
                warn!(
                    format = %to,
                    errors = report.errors.len(),
                    first_error = report.errors.first().map(String::as_str).unwrap_or_default(),
                    "Transformed payload failed validation"
                );
            }
        }

        Ok((value, stats))
    }
}

fn graph_root(graph: &DocumentGraph) -> Result<NodeId> {
    graph
        .root()
        .ok_or_else(|| Error::invalid_argument("graph", "graph has no root node"))
}

/// Envelope at the top of a payload; an `id` makes it a flat item instead
pub(crate) fn is_response_envelope(map: &Map<String, Value>) -> bool {
    is_envelope(map) && !map.contains_key("id")
}
