//! Arena-backed document model that can express shared and cyclic links
//!
//! A `serde_json::Value` is a tree, so an item can never relate to itself.
//! Hosts that hold relation graphs (an author whose posts link back to the
//! author) load them into a [`DocumentGraph`], where a node may be linked
//! from any number of places, ancestors included. Nodes are addressed by
//! [`NodeId`] handles, which is what the transformer's in-progress set keys on.

use crate::error::{Error, Result};
use crate::shape::ShapeProbe;
use serde_json::{Map, Number, Value};
use std::collections::HashSet;

/// Key of the marker object emitted in place of a circular reference
pub const CIRCULAR_REF_KEY: &str = "circularRef";

/// Values a single materialization or transform may emit by default
pub const DEFAULT_NODE_BUDGET: usize = 1_000_000;

/// `{ "circularRef": true }`
pub fn circular_ref_marker() -> Value {
    let mut marker = Map::new();
    marker.insert(CIRCULAR_REF_KEY.to_string(), Value::Bool(true));
    Value::Object(marker)
}

/// Values emitted so far against a graph's node budget
#[derive(Debug, Clone, Copy)]
pub(crate) struct NodeBudget {
    limit: usize,
    used: usize,
}

impl NodeBudget {
    pub(crate) fn spend(&mut self) -> Result<()> {
        if self.used >= self.limit {
            return Err(Error::NodeBudgetExceeded { limit: self.limit });
        }
        self.used += 1;
        Ok(())
    }
}

/// Stable handle of a node inside one [`DocumentGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A JSON node whose children are handles rather than owned values
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<NodeId>),
    /// Fields in insertion order
    Object(Vec<(String, NodeId)>),
}

impl Node {
    pub fn is_container(&self) -> bool {
        matches!(self, Node::Array(_) | Node::Object(_))
    }
}

/// Arena of JSON nodes with an optional root
///
/// Shared nodes are stored once but copied at every reference when the
/// graph is turned back into JSON, so a chain of `n` diamonds expands to
/// `2^n` values. The node budget caps that expansion.
#[derive(Debug, Clone)]
pub struct DocumentGraph {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    node_budget: usize,
}

impl Default for DocumentGraph {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            node_budget: DEFAULT_NODE_BUDGET,
        }
    }
}

impl DocumentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of values emitted when this graph is copied out
    pub fn with_node_budget(mut self, node_budget: usize) -> Self {
        self.node_budget = node_budget;
        self
    }

    pub fn node_budget(&self) -> usize {
        self.node_budget
    }

    /// Load a JSON tree; the tree's top becomes the root
    pub fn from_value(value: &Value) -> Self {
        let mut graph = Self::new();
        let root = graph.add_value(value);
        graph.root = Some(root);
        graph
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) -> Result<()> {
        self.check(id, "root")?;
        self.root = Some(id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Node lookup for handles that are known to belong to this graph
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Copy a JSON tree into the arena and return its top node
    pub fn add_value(&mut self, value: &Value) -> NodeId {
        let node = match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(*b),
            Value::Number(n) => Node::Number(n.clone()),
            Value::String(s) => Node::String(s.clone()),
            Value::Array(items) => {
                let children = items.iter().map(|item| self.add_value(item)).collect();
                Node::Array(children)
            }
            Value::Object(map) => {
                let fields = map
                    .iter()
                    .map(|(key, item)| (key.clone(), self.add_value(item)))
                    .collect();
                Node::Object(fields)
            }
        };
        self.push(node)
    }

    /// Add an empty object node
    pub fn add_object(&mut self) -> NodeId {
        self.push(Node::Object(Vec::new()))
    }

    /// Add an empty array node
    pub fn add_array(&mut self) -> NodeId {
        self.push(Node::Array(Vec::new()))
    }

    /// Link `child` under `key` of `object`, replacing any previous link
    pub fn set_field(&mut self, object: NodeId, key: impl Into<String>, child: NodeId) -> Result<()> {
        self.check(child, "child")?;
        self.check(object, "object")?;
        let key = key.into();

        match &mut self.nodes[object.0] {
            Node::Object(fields) => {
                match fields.iter_mut().find(|field| field.0 == key) {
                    Some(field) => field.1 = child,
                    None => fields.push((key, child)),
                }
                Ok(())
            }
            _ => Err(Error::invalid_argument(
                "object",
                format!("node {} is not an object", object.0),
            )),
        }
    }

    /// Append `child` to `array`
    pub fn push_element(&mut self, array: NodeId, child: NodeId) -> Result<()> {
        self.check(child, "child")?;
        self.check(array, "array")?;

        match &mut self.nodes[array.0] {
            Node::Array(children) => {
                children.push(child);
                Ok(())
            }
            _ => Err(Error::invalid_argument(
                "array",
                format!("node {} is not an array", array.0),
            )),
        }
    }

    /// Field of an object node
    pub fn field(&self, object: NodeId, key: &str) -> Option<NodeId> {
        match self.get(object)? {
            Node::Object(fields) => fields
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, child)| *child),
            _ => None,
        }
    }

    /// Rebuild a JSON tree below `id`
    ///
    /// A node reached again while its own subtree is being rebuilt becomes a
    /// circular reference marker; shared but acyclic nodes are copied each
    /// time they are reached. Fails with [`Error::NodeBudgetExceeded`] once
    /// more values than the node budget would be emitted.
    pub fn materialize(&self, id: NodeId) -> Result<Value> {
        self.check(id, "node")?;
        let mut cycles = 0;
        let mut budget = self.budget();
        self.materialize_counting(id, &mut cycles, &mut budget)
    }

    /// Fresh spend counter for this graph's node budget
    pub(crate) fn budget(&self) -> NodeBudget {
        NodeBudget {
            limit: self.node_budget,
            used: 0,
        }
    }

    /// [`materialize`](Self::materialize) for known handles, counting the
    /// circular references it replaced and charging `budget`
    pub(crate) fn materialize_counting(
        &self,
        id: NodeId,
        cycles: &mut usize,
        budget: &mut NodeBudget,
    ) -> Result<Value> {
        let mut visiting = HashSet::new();
        self.rebuild(id, &mut visiting, cycles, budget)
    }

    fn rebuild(
        &self,
        id: NodeId,
        visiting: &mut HashSet<NodeId>,
        cycles: &mut usize,
        budget: &mut NodeBudget,
    ) -> Result<Value> {
        let node = self.node(id);
        if node.is_container() && !visiting.insert(id) {
            *cycles += 1;
            return Ok(circular_ref_marker());
        }
        budget.spend()?;

        let value = match node {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(children) => Value::Array(
                children
                    .iter()
                    .map(|child| self.rebuild(*child, visiting, cycles, budget))
                    .collect::<Result<_>>()?,
            ),
            Node::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(key, child)| Ok((key.clone(), self.rebuild(*child, visiting, cycles, budget)?)))
                    .collect::<Result<_>>()?,
            ),
        };

        visiting.remove(&id);
        Ok(value)
    }

    /// Shape view over an object node
    pub(crate) fn object(&self, id: NodeId) -> Option<GraphObject<'_>> {
        match self.node(id) {
            Node::Object(fields) => Some(GraphObject { graph: self, fields }),
            _ => None,
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn check(&self, id: NodeId, argument: &str) -> Result<()> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(Error::invalid_argument(
                argument,
                format!("node {} does not belong to this graph", id.0),
            ))
        }
    }
}

impl From<&Value> for DocumentGraph {
    fn from(value: &Value) -> Self {
        Self::from_value(value)
    }
}

/// Borrowed object node, classified with the same rules as JSON maps
#[derive(Debug, Clone, Copy)]
pub(crate) struct GraphObject<'g> {
    graph: &'g DocumentGraph,
    fields: &'g [(String, NodeId)],
}

impl<'g> GraphObject<'g> {
    pub(crate) fn fields(&self) -> &'g [(String, NodeId)] {
        self.fields
    }

    pub(crate) fn get(&self, key: &str) -> Option<NodeId> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, child)| *child)
    }
}

impl<'g> ShapeProbe for GraphObject<'g> {
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn object_field(&self, key: &str) -> Option<Self> {
        self.get(key).and_then(|child| self.graph.object(child))
    }
}
