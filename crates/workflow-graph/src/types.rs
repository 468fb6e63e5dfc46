//! Core types for workflow graphs
//!
//! A workflow is a directed graph of typed nodes. The per-type metadata that
//! the editor side panel edits lives in `NodeData`, a sum type over the three
//! node kinds, so an Event-only field can never be read off a Status node.
//!
//! The Start node is stored apart from the other nodes: a `Workflow` holds
//! exactly one by construction and nothing outside this crate can remove it.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{edge_style, labels, workflow as workflow_defaults};
use crate::error::{GraphError, Result};

/// Unique identifier for a node
pub type NodeId = String;

/// Unique identifier for an edge
pub type EdgeId = String;

/// ID given to the Start node of every new workflow
pub const START_NODE_ID: &str = "start";

/// The kind of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// The single origin node of a workflow
    Start,
    /// A workflow state (older payloads call it "state")
    #[serde(alias = "state")]
    Status,
    /// A business event / transition block
    Event,
}

impl NodeType {
    /// Wire name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Status => "status",
            Self::Event => "event",
        }
    }

    /// The node type the "+" connector creates after a node of this type
    pub fn complement(&self) -> NodeType {
        match self {
            Self::Start | Self::Status => Self::Event,
            Self::Event => Self::Status,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canvas position of a node's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Return this position shifted by (dx, dy)
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Rendered size of a node as measured by the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// This size capped at `max` on both axes, or `None` unless both axes are positive
    pub fn clamped(self, max: f64) -> Option<Size> {
        if self.width > 0.0 && self.height > 0.0 {
            Some(Size::new(self.width.min(max), self.height.min(max)))
        } else {
            None
        }
    }
}

/// Payload of the Start node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartData {
    pub label: String,
    /// True while Start has no outgoing edge; derived, never set by callers
    #[serde(default)]
    pub show_ghost_edge: bool,
}

impl Default for StartData {
    fn default() -> Self {
        Self {
            label: labels::START.to_string(),
            show_ghost_edge: true,
        }
    }
}

/// Payload of a Status (state) node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusData {
    pub label: String,
    /// Display name of the state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_event_name: Option<String>,
}

/// Payload of an Event (transition block) node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventData {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_event_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub automatic_trigger: bool,
    pub external_trigger: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focal_entity: Option<String>,
    pub created_entities: Vec<String>,
    pub modified_entities: Vec<String>,
}

/// Type-specific node payload
///
/// Serializes adjacently tagged, which flattens into the node as
/// `"type": "event", "data": {...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum NodeData {
    Start(StartData),
    #[serde(alias = "state")]
    Status(StatusData),
    Event(EventData),
}

impl NodeData {
    /// Default payload for a new node of the given type
    pub fn for_type(node_type: NodeType, label: impl Into<String>) -> Self {
        let label = label.into();
        match node_type {
            NodeType::Start => Self::Start(StartData {
                label,
                ..StartData::default()
            }),
            NodeType::Status => Self::Status(StatusData {
                label,
                ..StatusData::default()
            }),
            NodeType::Event => Self::Event(EventData {
                label,
                ..EventData::default()
            }),
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Start(_) => NodeType::Start,
            Self::Status(_) => NodeType::Status,
            Self::Event(_) => NodeType::Event,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Start(d) => &d.label,
            Self::Status(d) => &d.label,
            Self::Event(d) => &d.label,
        }
    }

    /// Text the canvas shows on the node; unlabeled Event nodes show guidance
    pub fn display_label(&self) -> &str {
        match self {
            Self::Event(d) if d.label.trim().is_empty() => labels::EVENT_PLACEHOLDER,
            other => other.label(),
        }
    }

    /// Name used to refer to the node in validation messages
    pub fn display_name(&self) -> &str {
        match self {
            Self::Start(_) => labels::START,
            Self::Status(d) => first_non_empty(
                d.business_event_name.as_deref(),
                &d.label,
                labels::UNNAMED_STATUS,
            ),
            Self::Event(d) => first_non_empty(
                d.business_event_name.as_deref(),
                &d.label,
                labels::UNNAMED_EVENT,
            ),
        }
    }
}

fn first_non_empty<'a>(preferred: Option<&'a str>, label: &'a str, fallback: &'a str) -> &'a str {
    match preferred {
        Some(name) if !name.is_empty() => name,
        _ if !label.is_empty() => label,
        _ => fallback,
    }
}

/// A node instance in a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
    /// Unique, immutable identifier
    pub id: NodeId,
    /// Position on the canvas; owned by the layout engine when auto-positioning
    pub position: Position,
    /// Type tag and type-specific payload
    #[serde(flatten)]
    pub data: NodeData,
    /// Size reported by the canvas, if it has measured the node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured: Option<Size>,
}

impl WorkflowNode {
    pub fn new(id: impl Into<String>, position: Position, data: NodeData) -> Self {
        Self {
            id: id.into(),
            position,
            data,
            measured: None,
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.data.node_type()
    }

    pub fn is_start(&self) -> bool {
        matches!(self.data, NodeData::Start(_))
    }

    /// Record the size the canvas measured for this node
    pub fn with_measured(mut self, width: f64, height: f64) -> Self {
        self.measured = Some(Size::new(width, height));
        self
    }
}

/// A directed edge between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowEdge {
    /// Unique identifier for this edge
    pub id: EdgeId,
    /// Source node ID
    pub source: NodeId,
    /// Target node ID
    pub target: NodeId,
    /// Visual style; passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<serde_json::Value>,
}

impl WorkflowEdge {
    /// Create an edge with the engine's ID scheme and default style
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("edge-{}-{}", source, target),
            source,
            target,
            style: Some(default_edge_style()),
        }
    }

    /// Whether this edge starts or ends at the node
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }

    /// Whether this edge joins the two nodes, in either direction
    pub fn joins(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// Style stamped on edges the engine creates
pub fn default_edge_style() -> serde_json::Value {
    serde_json::json!({
        "strokeWidth": edge_style::STROKE_WIDTH,
        "stroke": edge_style::STROKE,
        "markerEnd": { "type": edge_style::MARKER, "color": edge_style::STROKE },
    })
}

/// A complete workflow: metadata plus the node/edge graph
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    /// Human-readable name
    pub name: String,
    description: String,
    start: WorkflowNode,
    /// Non-Start nodes in insertion order
    nodes: Vec<WorkflowNode>,
    edges: Vec<WorkflowEdge>,
    /// Whether node positions are computed by the layout engine
    pub auto_positioning_enabled: bool,
}

impl Workflow {
    /// Create a workflow holding only the Start node
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            start: initial_start_node(),
            nodes: Vec::new(),
            edges: Vec::new(),
            auto_positioning_enabled: true,
        }
    }

    /// Assemble a workflow from loose parts, checking every structural invariant
    ///
    /// Exactly one Start node, unique node and edge IDs, edges between existing
    /// nodes, no self-loops and at most one edge per unordered node pair.
    pub fn from_parts(
        name: impl Into<String>,
        description: impl Into<String>,
        nodes: Vec<WorkflowNode>,
        edges: Vec<WorkflowEdge>,
        auto_positioning_enabled: bool,
    ) -> Result<Self> {
        let start_count = nodes.iter().filter(|n| n.is_start()).count();
        if start_count != 1 {
            return Err(GraphError::StartNodeCount(start_count));
        }

        let mut seen_nodes: HashSet<&str> = HashSet::new();
        for node in &nodes {
            if !seen_nodes.insert(node.id.as_str()) {
                return Err(GraphError::DuplicateNodeId(node.id.clone()));
            }
        }

        let mut seen_edges: HashSet<&str> = HashSet::new();
        for (index, edge) in edges.iter().enumerate() {
            for endpoint in [&edge.source, &edge.target] {
                if !seen_nodes.contains(endpoint.as_str()) {
                    return Err(GraphError::DanglingEdge {
                        edge_id: edge.id.clone(),
                        node_id: endpoint.clone(),
                    });
                }
            }
            if edge.source == edge.target {
                return Err(GraphError::SelfLoop {
                    edge_id: edge.id.clone(),
                    node_id: edge.source.clone(),
                });
            }
            let pair_taken = edges[..index]
                .iter()
                .any(|other| other.joins(&edge.source, &edge.target));
            if !seen_edges.insert(edge.id.as_str()) || pair_taken {
                return Err(GraphError::DuplicateEdge {
                    edge_id: edge.id.clone(),
                    source_id: edge.source.clone(),
                    target_id: edge.target.clone(),
                });
            }
        }

        let mut start = None;
        let mut rest = Vec::with_capacity(nodes.len().saturating_sub(1));
        for node in nodes {
            if node.is_start() {
                start = Some(node);
            } else {
                rest.push(node);
            }
        }
        let start = start.ok_or(GraphError::StartNodeCount(0))?;

        let mut workflow = Self {
            name: name.into(),
            description: String::new(),
            start,
            nodes: rest,
            edges,
            auto_positioning_enabled,
        };
        workflow.set_description(description);
        workflow.refresh_derived();
        Ok(workflow)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Set the description, truncated to the 240-character cap
    pub fn set_description(&mut self, description: impl Into<String>) {
        let description = description.into();
        let cap = workflow_defaults::MAX_DESCRIPTION_CHARS;
        self.description = if description.chars().count() > cap {
            log::debug!("Truncating workflow description to {} characters", cap);
            description.chars().take(cap).collect()
        } else {
            description
        };
    }

    /// The Start node
    pub fn start_node(&self) -> &WorkflowNode {
        &self.start
    }

    /// All nodes, Start first, then the rest in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &WorkflowNode> {
        std::iter::once(&self.start).chain(self.nodes.iter())
    }

    /// Non-Start nodes in insertion order
    pub fn steps(&self) -> &[WorkflowNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len() + 1
    }

    pub fn edges(&self) -> &[WorkflowEdge] {
        &self.edges
    }

    /// Find a node by ID
    pub fn find_node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes().find(|n| n.id == id)
    }

    /// Find a node by ID, failing if it does not exist
    pub fn require_node(&self, id: &str) -> Result<&WorkflowNode> {
        self.find_node(id).ok_or_else(|| GraphError::node_not_found(id))
    }

    /// Find an edge by ID
    pub fn find_edge(&self, id: &str) -> Option<&WorkflowEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Get edges coming into a node
    pub fn incoming_edges<'a>(
        &'a self,
        node_id: &'a str,
    ) -> impl Iterator<Item = &'a WorkflowEdge> + 'a {
        self.edges.iter().filter(move |e| e.target == node_id)
    }

    /// Get edges going out of a node
    pub fn outgoing_edges<'a>(
        &'a self,
        node_id: &'a str,
    ) -> impl Iterator<Item = &'a WorkflowEdge> + 'a {
        self.edges.iter().filter(move |e| e.source == node_id)
    }

    /// IDs of the nodes this node points at, in edge order
    pub fn children<'a>(&'a self, node_id: &'a str) -> Vec<&'a str> {
        self.outgoing_edges(node_id).map(|e| e.target.as_str()).collect()
    }

    /// Whether any edge joins the two nodes, in either direction
    pub fn has_edge_between(&self, a: &str, b: &str) -> bool {
        self.edges.iter().any(|e| e.joins(a, b))
    }

    /// Whether only the Start node exists
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn find_node_mut(&mut self, id: &str) -> Option<&mut WorkflowNode> {
        if self.start.id == id {
            return Some(&mut self.start);
        }
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut WorkflowNode> {
        std::iter::once(&mut self.start).chain(self.nodes.iter_mut())
    }

    pub(crate) fn push_node(&mut self, node: WorkflowNode) -> Result<()> {
        if node.is_start() {
            return Err(GraphError::StartNodeNotPlaceable);
        }
        if self.find_node(&node.id).is_some() {
            return Err(GraphError::DuplicateNodeId(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    pub(crate) fn push_edge(&mut self, edge: WorkflowEdge) {
        self.edges.push(edge);
        self.refresh_derived();
    }

    /// Remove a non-Start node and every edge touching it
    pub(crate) fn remove_node(&mut self, node_id: &str) -> Result<WorkflowNode> {
        if self.start.id == node_id {
            return Err(GraphError::StartNodeImmutable(node_id.to_string()));
        }
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == node_id)
            .ok_or_else(|| GraphError::node_not_found(node_id))?;
        let removed = self.nodes.remove(index);
        self.edges.retain(|e| !e.touches(node_id));
        self.refresh_derived();
        Ok(removed)
    }

    pub(crate) fn remove_edge(&mut self, edge_id: &str) -> Result<WorkflowEdge> {
        let index = self
            .edges
            .iter()
            .position(|e| e.id == edge_id)
            .ok_or_else(|| GraphError::EdgeNotFound(edge_id.to_string()))?;
        let removed = self.edges.remove(index);
        self.refresh_derived();
        Ok(removed)
    }

    /// Drop every node but Start and every edge
    pub(crate) fn reset_to_start(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.start.position = initial_start_node().position;
        self.refresh_derived();
    }

    /// Re-derive fields that follow from the graph (the Start ghost edge)
    pub(crate) fn refresh_derived(&mut self) {
        let has_outgoing = self.edges.iter().any(|e| e.source == self.start.id);
        if let NodeData::Start(data) = &mut self.start.data {
            data.show_ghost_edge = !has_outgoing;
        }
    }
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new(workflow_defaults::DEFAULT_NAME)
    }
}

fn initial_start_node() -> WorkflowNode {
    let (x, y) = crate::constants::spacing::START_ANCHOR;
    WorkflowNode::new(
        START_NODE_ID,
        Position::new(x, y),
        NodeData::Start(StartData::default()),
    )
}
