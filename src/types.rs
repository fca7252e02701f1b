//! Core data types and structures for the flow builder.
//!
//! This module defines the data model for the canvas — palette definitions,
//! placed nodes, sticky connections, the transient connection preview — and
//! the `Graph` store whose operations the canvas gestures drive.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for placed nodes.
pub type NodeId = Uuid;

/// Unique identifier for committed connections.
pub type EdgeId = Uuid;

/// `code_id` of the singleton entry block representing the flow's
/// invocation trigger.
pub const ENTRY_CODE_ID: &str = "start_command";

/// Which side of a node a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortKind {
    /// Left-hand socket receiving a value.
    Input,
    /// Right-hand socket producing a value.
    Output,
}

/// A named, typed slot declared by a palette definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// Port name, unique within its side of the block.
    pub name: String,
    /// Wire type name ("number" | "string" | "boolean" | "any" | "void" | ...).
    #[serde(rename = "type")]
    pub ty: String,
    /// Human-readable description shown in the details panel.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,
    /// Optional default constant for an unwired input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl Port {
    /// Creates a port with no description or default.
    pub fn new(name: &str, ty: &str) -> Self {
        Self {
            name: name.to_string(),
            ty: ty.to_string(),
            desc: String::new(),
            default: None,
        }
    }

    /// Builder-style description setter used by the static palette.
    pub fn desc(mut self, desc: &str) -> Self {
        self.desc = desc.to_string();
        self
    }

    /// Ports of `void`/`null` type carry no value and render no socket.
    pub fn carries_value(&self) -> bool {
        self.ty != "void" && self.ty != "null"
    }
}

/// A palette entry: the static definition a canvas node instantiates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockDef {
    /// Stable identifier tying placed nodes back to this definition.
    pub code_id: String,
    /// Display name shown in the palette and on the node header.
    pub label: String,
    /// One-line documentation shown in the details panel.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc: String,
    /// Declared input ports.
    pub inputs: Vec<Port>,
    /// Declared output ports.
    pub outputs: Vec<Port>,
}

impl BlockDef {
    /// Whether this is the distinguished singleton entry definition.
    pub fn is_entry(&self) -> bool {
        self.code_id == ENTRY_CODE_ID
    }
}

/// A placed block instance on the canvas.
///
/// `x, y` anchor the node's visual center in canvas coordinates; rendering
/// derives the rest of the geometry from the declared ports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier, assigned at drop time.
    pub id: NodeId,
    /// Palette definition this node instantiates.
    pub code_id: String,
    /// Display label copied from the definition.
    pub label: String,
    /// Horizontal anchor in canvas coordinates.
    pub x: f32,
    /// Vertical anchor in canvas coordinates.
    pub y: f32,
    /// Declared input ports (copied from the definition at drop time).
    #[serde(default)]
    pub inputs: Vec<Port>,
    /// Declared output ports (copied from the definition at drop time).
    #[serde(default)]
    pub outputs: Vec<Port>,
    /// Dynamic per-node values: constants typed into unwired inputs, and
    /// entry-node metadata (`command`, `description`, `options`).
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Node {
    /// Instantiates a node from a palette definition at the given canvas
    /// position with a fresh unique id.
    pub fn from_def(def: &BlockDef, x: f32, y: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            code_id: def.code_id.clone(),
            label: def.label.clone(),
            x,
            y,
            inputs: def.inputs.clone(),
            outputs: def.outputs.clone(),
            fields: serde_json::Map::new(),
        }
    }

    /// Whether this node is the flow's entry node.
    pub fn is_entry(&self) -> bool {
        self.code_id == ENTRY_CODE_ID
    }

    /// Looks up a dynamic field value by name.
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }

    /// Returns a dynamic field as a string, if it is one.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }

    /// Output ports that carry a value (void/null outputs render no socket).
    pub fn visible_outputs(&self) -> impl Iterator<Item = &Port> {
        self.outputs.iter().filter(|p| p.carries_value())
    }

    /// Number of port rows the node body needs.
    pub fn port_rows(&self) -> usize {
        self.inputs.len().max(self.visible_outputs().count()).max(1)
    }
}

/// A committed connection between an output port and an input port.
///
/// The offsets were captured once, at connection time, as the pointer's
/// displacement from each endpoint node's anchor. Rendered endpoints are
/// recomputed from current node positions every frame, which is what makes
/// the line track ("stick to") its nodes as they move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Unique identifier, disjoint from node ids.
    pub id: EdgeId,
    /// Node owning the output end.
    pub source_id: NodeId,
    /// Output port name on the source node.
    pub source_port: String,
    /// Node owning the input end.
    pub target_id: NodeId,
    /// Input port name on the target node.
    pub target_port: String,
    /// Anchor offset of the line start from the source node's position.
    pub source_offset_x: f32,
    /// See `source_offset_x`.
    pub source_offset_y: f32,
    /// Anchor offset of the line end from the target node's position.
    pub target_offset_x: f32,
    /// See `target_offset_x`.
    pub target_offset_y: f32,
}

/// The in-progress connection preview during a connect gesture.
///
/// Exists only while the gesture is active and is discarded on mouse
/// release regardless of outcome. The anchored end is immutable once the
/// gesture starts; only the floating end follows the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct TempLine {
    /// Node the gesture started on.
    pub origin_id: NodeId,
    /// Port the gesture started on.
    pub origin_port: String,
    /// Side the gesture started on; either end can be grabbed first.
    pub origin_kind: PortKind,
    /// Anchor offset from the origin node's position, captured at start.
    pub origin_offset_x: f32,
    /// See `origin_offset_x`.
    pub origin_offset_y: f32,
    /// Floating end, in canvas coordinates.
    pub end_x: f32,
    /// See `end_x`.
    pub end_y: f32,
}

impl TempLine {
    /// Moves the floating end to follow the pointer. The anchored end does
    /// not change.
    pub fn follow(&mut self, x: f32, y: f32) {
        self.end_x = x;
        self.end_y = y;
    }
}

/// Structural rejections raised by graph store operations.
///
/// These never corrupt store state; the UI surfaces them as transient
/// warnings and the operation is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A second entry block was dropped while one already exists.
    #[error("a flow can only contain one Start Command block")]
    EntryExists,
    /// An operation referenced a node that is not in the store.
    #[error("that block no longer exists")]
    UnknownNode,
    /// Both ends of a connection landed on the same node.
    #[error("a block cannot be connected to itself")]
    SelfConnection,
    /// Both ends of a connection landed on the same kind of port.
    #[error("connections go from an output to an input")]
    SamePortKind,
    /// The input port already has an incoming connection.
    #[error("input '{0}' already has a connection")]
    PortOccupied(String),
}

/// A saved graph: nodes, edges, and persistence metadata.
///
/// This is the wire document exchanged with the flow-storage backend.
/// `flow_id` is `None` for a flow that has never been saved and is set once
/// the backend has assigned one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    /// All placed nodes.
    pub nodes: Vec<Node>,
    /// All committed connections.
    pub edges: Vec<Edge>,
    /// Display name, derived from the entry node's command on save.
    #[serde(default)]
    pub name: String,
    /// Backend-assigned identifier; serialized as `null` before first save.
    #[serde(default)]
    pub flow_id: Option<String>,
}

/// The editing session's graph: the node store and the edge store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    /// Map of all placed nodes, indexed by their id.
    pub nodes: HashMap<NodeId, Node>,
    /// List of all committed connections.
    pub edges: Vec<Edge>,
}

impl Graph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiates a node from a palette definition at the given canvas
    /// position and appends it.
    ///
    /// Rejects the singleton entry definition when an entry node already
    /// exists; the store is left unchanged.
    pub fn add_node(&mut self, def: &BlockDef, x: f32, y: f32) -> Result<NodeId, GraphError> {
        if def.is_entry() && self.entry_node().is_some() {
            return Err(GraphError::EntryExists);
        }
        let node = Node::from_def(def, x, y);
        let id = node.id;
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Repositions a node. No bounds clamping; the canvas is conceptually
    /// infinite.
    pub fn move_node(&mut self, id: NodeId, x: f32, y: f32) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.x = x;
            node.y = y;
        }
    }

    /// Upserts a dynamic field value on a node. Returns `false` if the node
    /// does not exist.
    pub fn set_field(&mut self, id: NodeId, name: &str, value: serde_json::Value) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.fields.insert(name.to_string(), value);
                true
            }
            None => false,
        }
    }

    /// Deletes a node and cascades removal of every edge touching it.
    ///
    /// Returns `true` if the node was found and removed.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let removed = self.nodes.remove(&id).is_some();
        if removed {
            self.remove_edges_touching(id);
        }
        removed
    }

    /// Starts a connection gesture from a port, capturing the pointer's
    /// offset from the origin node's anchor. Returns `None` if the node is
    /// not in the store.
    pub fn begin_connection(
        &self,
        origin_id: NodeId,
        origin_port: &str,
        origin_kind: PortKind,
        pointer_x: f32,
        pointer_y: f32,
    ) -> Option<TempLine> {
        let node = self.nodes.get(&origin_id)?;
        Some(TempLine {
            origin_id,
            origin_port: origin_port.to_string(),
            origin_kind,
            origin_offset_x: pointer_x - node.x,
            origin_offset_y: pointer_y - node.y,
            end_x: pointer_x,
            end_y: pointer_y,
        })
    }

    /// Commits an in-progress connection onto a drop port.
    ///
    /// The edge is always stored output→input regardless of which end the
    /// gesture was grabbed from first. The drop side's anchor offset is
    /// captured here, the same way the origin's was at gesture start.
    /// Uniqueness is scoped per (target node, target port): a given input
    /// may only receive one edge, while same-named inputs on other nodes
    /// remain wirable.
    pub fn commit_connection(
        &mut self,
        line: &TempLine,
        drop_id: NodeId,
        drop_port: &str,
        drop_kind: PortKind,
        pointer_x: f32,
        pointer_y: f32,
    ) -> Result<EdgeId, GraphError> {
        let drop_node = self.nodes.get(&drop_id).ok_or(GraphError::UnknownNode)?;
        if self.nodes.get(&line.origin_id).is_none() {
            return Err(GraphError::UnknownNode);
        }
        if drop_id == line.origin_id {
            return Err(GraphError::SelfConnection);
        }
        if drop_kind == line.origin_kind {
            return Err(GraphError::SamePortKind);
        }
        let drop_offset_x = pointer_x - drop_node.x;
        let drop_offset_y = pointer_y - drop_node.y;

        // Orient the edge by port kind; either end may have been grabbed first.
        let (source_id, source_port, source_off, target_id, target_port, target_off) =
            match line.origin_kind {
                PortKind::Output => (
                    line.origin_id,
                    line.origin_port.clone(),
                    (line.origin_offset_x, line.origin_offset_y),
                    drop_id,
                    drop_port.to_string(),
                    (drop_offset_x, drop_offset_y),
                ),
                PortKind::Input => (
                    drop_id,
                    drop_port.to_string(),
                    (drop_offset_x, drop_offset_y),
                    line.origin_id,
                    line.origin_port.clone(),
                    (line.origin_offset_x, line.origin_offset_y),
                ),
            };

        if self.target_occupied(target_id, &target_port) {
            return Err(GraphError::PortOccupied(target_port));
        }

        let edge = Edge {
            id: Uuid::new_v4(),
            source_id,
            source_port,
            target_id,
            target_port,
            source_offset_x: source_off.0,
            source_offset_y: source_off.1,
            target_offset_x: target_off.0,
            target_offset_y: target_off.1,
        };
        let id = edge.id;
        self.edges.push(edge);
        Ok(id)
    }

    /// Removes a single edge by id. Returns `true` if it existed.
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != id);
        self.edges.len() != before
    }

    /// Removes every edge whose source or target is the given node.
    /// Returns the number of edges removed.
    pub fn remove_edges_touching(&mut self, node_id: NodeId) -> usize {
        let before = self.edges.len();
        self.edges
            .retain(|e| e.source_id != node_id && e.target_id != node_id);
        before - self.edges.len()
    }

    /// Whether an edge already targets the given input port on the given
    /// node.
    pub fn target_occupied(&self, node_id: NodeId, port: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.target_id == node_id && e.target_port == port)
    }

    /// Looks up the edge feeding the given input port, if any.
    pub fn incoming_edge(&self, node_id: NodeId, port: &str) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.target_id == node_id && e.target_port == port)
    }

    /// The singleton entry node, if one has been placed.
    pub fn entry_node(&self) -> Option<&Node> {
        self.nodes.values().find(|n| n.is_entry())
    }

    /// Live endpoints of an edge: each endpoint node's current position
    /// plus the stored anchor offset. Returns `None` for a dangling edge
    /// (either endpoint node gone), which callers must skip.
    pub fn edge_endpoints(&self, edge: &Edge) -> Option<((f32, f32), (f32, f32))> {
        let source = self.nodes.get(&edge.source_id)?;
        let target = self.nodes.get(&edge.target_id)?;
        Some((
            (
                source.x + edge.source_offset_x,
                source.y + edge.source_offset_y,
            ),
            (
                target.x + edge.target_offset_x,
                target.y + edge.target_offset_y,
            ),
        ))
    }

    /// Name a save of this graph should carry: the entry node's command,
    /// or "untitled" when there is none yet.
    pub fn derived_name(&self) -> String {
        self.entry_node()
            .and_then(|n| n.field_str("command"))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("untitled")
            .to_string()
    }

    /// Converts the session stores into a transmissible flow document.
    pub fn to_flow(&self, name: String, flow_id: Option<String>) -> Flow {
        Flow {
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges.clone(),
            name,
            flow_id,
        }
    }

    /// Rebuilds the session stores wholesale from a flow document.
    pub fn from_flow(flow: &Flow) -> Self {
        Self {
            nodes: flow.nodes.iter().map(|n| (n.id, n.clone())).collect(),
            edges: flow.edges.clone(),
        }
    }
}
