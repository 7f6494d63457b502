//! Recursive shape conversion over a document graph
//!
//! One [`Walk`] lives for one top-level call. It owns the in-progress set
//! used by the cycle guard and the counters reported by the metrics
//! variant. Every container node is marked in-progress on entry and
//! unmarked on exit, so a node shared between sibling branches is converted
//! in each of them. Shared nodes are converted at every reference, so
//! every emitted value is charged against the graph's node budget; the
//! first overrun aborts the walk.
//!
//! Copyright (c) 2025 cms-bridge contributors
//! Licensed under the Apache-2.0 license

use super::types::{TransformOptions, WalkStats};
use crate::error::Error;
use crate::graph::{circular_ref_marker, DocumentGraph, GraphObject, Node, NodeBudget, NodeId};
use crate::id_mapper::IdMapper;
use crate::shape::{classify_object, Shape, ShapeProbe, MEDIA_RESOURCE_TYPE};
use crate::types::LegacyId;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{trace, warn};

/// Conversion direction, derived from the target format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    ToModern,
    ToLegacy,
}

pub(crate) struct Walk<'w> {
    graph: &'w DocumentGraph,
    mapper: &'w mut IdMapper,
    options: &'w TransformOptions,
    direction: Direction,
    max_depth: usize,
    in_progress: HashSet<NodeId>,
    budget: NodeBudget,
    failure: Option<Error>,
    pub(crate) stats: WalkStats,
}

impl<'w> Walk<'w> {
    pub(crate) fn new(
        graph: &'w DocumentGraph,
        mapper: &'w mut IdMapper,
        options: &'w TransformOptions,
        direction: Direction,
        max_depth: usize,
    ) -> Self {
        Self {
            graph,
            mapper,
            options,
            direction,
            max_depth,
            in_progress: HashSet::new(),
            budget: graph.budget(),
            failure: None,
            stats: WalkStats::default(),
        }
    }

    /// The error that aborted the walk, if any
    pub(crate) fn take_failure(&mut self) -> Option<Error> {
        self.failure.take()
    }

    /// Convert the subtree below `id`, reached at `depth`
    pub(crate) fn run(&mut self, id: NodeId, depth: usize) -> Value {
        if self.failure.is_some() {
            return Value::Null;
        }
        if depth > self.max_depth {
            warn!(
                depth,
                max_depth = self.max_depth,
                "Maximum transform depth exceeded, leaving branch unconverted"
            );
            self.stats.depth_cutoffs += 1;
            return self.materialize(id);
        }
        if let Err(err) = self.budget.spend() {
            return self.fail(err);
        }

        let graph = self.graph;
        match graph.node(id) {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(children) => self.guarded(id, |walk| {
                Value::Array(children.iter().map(|child| walk.run(*child, depth)).collect())
            }),
            Node::Object(_) => self.guarded(id, |walk| match graph.object(id) {
                Some(object) => walk.convert_object(object, depth),
                None => Value::Null,
            }),
        }
    }

    /// Unconverted copy of the subtree below `id`
    fn materialize(&mut self, id: NodeId) -> Value {
        match self
            .graph
            .materialize_counting(id, &mut self.stats.circular_refs, &mut self.budget)
        {
            Ok(value) => value,
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: Error) -> Value {
        if self.failure.is_none() {
            warn!(error = %err, "Transform aborted");
            self.failure = Some(err);
        }
        Value::Null
    }

    /// Run `convert` with `id` marked in-progress, or emit the marker when
    /// `id` is already being converted further up
    fn guarded(&mut self, id: NodeId, convert: impl FnOnce(&mut Self) -> Value) -> Value {
        if !self.in_progress.insert(id) {
            warn!(node = id.index(), "Circular reference detected");
            self.stats.circular_refs += 1;
            return circular_ref_marker();
        }

        let value = convert(self);
        self.in_progress.remove(&id);
        value
    }

    fn convert_object(&mut self, object: GraphObject<'w>, depth: usize) -> Value {
        let shape = classify_object(object);
        trace!(?shape, depth, "Converting object");

        let options = self.options;
        match (self.direction, shape) {
            (Direction::ToModern, Shape::LegacyItem) => {
                self.legacy_item_to_modern(object, depth, &options.content_type)
            }
            (Direction::ToModern, Shape::FlatLegacyItem) => {
                self.flat_item_to_modern(object, depth, &options.content_type)
            }
            (Direction::ToModern, Shape::LegacyRelation) => match object.get("data") {
                Some(data) => self.run(data, depth),
                None => Value::Null,
            },
            (Direction::ToModern, Shape::MediaObject) => self.media_to_modern(object, depth),
            (Direction::ToModern, _) => self.copy_object(object, depth),

            (Direction::ToLegacy, Shape::ModernItem) => {
                self.modern_item_to_legacy(object, depth, &options.content_type)
            }
            (Direction::ToLegacy, Shape::MediaObject) => self.media_to_legacy(object, depth),
            (Direction::ToLegacy, _) => self.copy_object(object, depth),
        }
    }

    /// `{ id, attributes }` to `{ documentId, id?, ...attributes }`
    fn legacy_item_to_modern(&mut self, object: GraphObject<'w>, depth: usize, resource_type: &str) -> Value {
        let mut result = self.modern_identity(object, resource_type);

        if let Some(attributes) = object.object_field("attributes") {
            for (key, child) in attributes.fields() {
                let value = self.run(*child, depth + 1);
                result.insert(key.clone(), value);
            }
        }

        self.stats.converted_items += 1;
        Value::Object(result)
    }

    /// `{ id, ...fields }` to `{ documentId, id?, ...fields }`
    fn flat_item_to_modern(&mut self, object: GraphObject<'w>, depth: usize, resource_type: &str) -> Value {
        let mut result = self.modern_identity(object, resource_type);

        for (key, child) in object.fields() {
            if key == "id" {
                continue;
            }
            let value = self.run(*child, depth + 1);
            result.insert(key.clone(), value);
        }

        self.stats.converted_items += 1;
        Value::Object(result)
    }

    /// Media keeps its file fields; identifiers map under the media type
    fn media_to_modern(&mut self, object: GraphObject<'w>, depth: usize) -> Value {
        if object.has("documentId") {
            return self.copy_object(object, depth);
        }

        match object.object_field("attributes") {
            Some(_) => self.legacy_item_to_modern(object, depth, MEDIA_RESOURCE_TYPE),
            None => self.flat_item_to_modern(object, depth, MEDIA_RESOURCE_TYPE),
        }
    }

    /// `{ documentId, id?, ...fields }` to `{ id, attributes }`
    fn modern_item_to_legacy(&mut self, object: GraphObject<'w>, depth: usize, resource_type: &str) -> Value {
        let id = self.legacy_identity(object, resource_type);

        let mut attributes = Map::new();
        for (key, child) in object.fields() {
            if key == "documentId" || key == "id" {
                continue;
            }
            let value = self.attribute_to_legacy(*child, depth + 1);
            attributes.insert(key.clone(), value);
        }

        self.stats.converted_items += 1;

        let mut result = Map::new();
        result.insert("id".to_string(), id);
        result.insert("attributes".to_string(), Value::Object(attributes));
        Value::Object(result)
    }

    fn media_to_legacy(&mut self, object: GraphObject<'w>, depth: usize) -> Value {
        if object.object_field("attributes").is_some() {
            return self.copy_object(object, depth);
        }
        self.modern_item_to_legacy(object, depth, MEDIA_RESOURCE_TYPE)
    }

    /// Shape-neutral copy; children continue in the current direction
    fn copy_object(&mut self, object: GraphObject<'w>, depth: usize) -> Value {
        let mut result = Map::new();
        for (key, child) in object.fields() {
            let value = match self.direction {
                Direction::ToModern => self.run(*child, depth + 1),
                Direction::ToLegacy => self.attribute_to_legacy(*child, depth + 1),
            };
            result.insert(key.clone(), value);
        }
        Value::Object(result)
    }

    /// Convert an attribute value, wrapping relations into `{ data }`
    fn attribute_to_legacy(&mut self, id: NodeId, depth: usize) -> Value {
        if depth <= self.max_depth && self.is_modern_relation(id) {
            let mut wrapper = Map::new();
            wrapper.insert("data".to_string(), self.run(id, depth));
            return Value::Object(wrapper);
        }
        self.run(id, depth)
    }

    /// Modern items, media and arrays made only of those are relations
    fn is_modern_relation(&self, id: NodeId) -> bool {
        match self.graph.node(id) {
            Node::Object(_) => self.is_related_item(id),
            Node::Array(children) => children.iter().all(|child| self.is_related_item(*child)),
            _ => false,
        }
    }

    fn is_related_item(&self, id: NodeId) -> bool {
        self.graph
            .object(id)
            .map(|object| matches!(classify_object(object), Shape::ModernItem | Shape::MediaObject))
            .unwrap_or(false)
    }

    /// `documentId` (and `id` when preserved) of a converted item
    fn modern_identity(&mut self, object: GraphObject<'w>, resource_type: &str) -> Map<String, Value> {
        let mut result = Map::new();
        let legacy_id = object
            .get("id")
            .map(|id| self.materialize(id));

        if let Some(id) = legacy_id.as_ref().and_then(LegacyId::from_value) {
            let document_id = self.mapper.to_modern_id(&id, resource_type);
            result.insert("documentId".to_string(), Value::String(document_id));
        }
        if self.options.preserve_original_id {
            if let Some(id) = legacy_id {
                result.insert("id".to_string(), id);
            }
        }
        result
    }

    /// `id` of an item converted back: its own `id` or the reverse mapping
    fn legacy_identity(&mut self, object: GraphObject<'w>, resource_type: &str) -> Value {
        if let Some(id) = object.get("id") {
            let id = self.materialize(id);
            if !id.is_null() {
                return id;
            }
        }

        let graph = self.graph;
        match object.get("documentId").map(|id| graph.node(id)) {
            Some(Node::String(document_id)) => {
                self.mapper.to_legacy_id(document_id, resource_type).to_value()
            }
            Some(Node::Number(n)) => self.mapper.to_legacy_id(&n.to_string(), resource_type).to_value(),
            _ => Value::Null,
        }
    }
}
