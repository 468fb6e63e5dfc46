//! Fluent builder for workflows
//!
//! Assembles arbitrary graphs directly, including ones the mutation API would
//! never produce (orphans, cycles, half-filled metadata). `build` still checks
//! the structural invariants.

use crate::error::Result;
use crate::types::{
    EventData, NodeData, Position, StartData, StatusData, Workflow, WorkflowEdge, WorkflowNode,
    START_NODE_ID,
};

/// Fluent builder for constructing workflows
///
/// # Example
///
/// ```ignore
/// let workflow = WorkflowBuilder::new("Order Flow")
///     .add_event("event-1", EventData::default())
///     .add_status("status-1", "Shipped")
///     .at(400.0, 200.0)
///     .add_edge("start", "event-1")
///     .add_edge("event-1", "status-1")
///     .build()?;
/// ```
pub struct WorkflowBuilder {
    name: String,
    description: String,
    nodes: Vec<WorkflowNode>,
    edges: Vec<WorkflowEdge>,
    auto_positioning_enabled: bool,
}

impl WorkflowBuilder {
    /// Create a builder holding the Start node
    pub fn new(name: impl Into<String>) -> Self {
        let (x, y) = crate::constants::spacing::START_ANCHOR;
        Self {
            name: name.into(),
            description: String::new(),
            nodes: vec![WorkflowNode::new(
                START_NODE_ID,
                Position::new(x, y),
                NodeData::Start(StartData::default()),
            )],
            edges: Vec::new(),
            auto_positioning_enabled: true,
        }
    }

    /// Set the workflow description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set whether positions are engine-computed
    pub fn auto_positioning(mut self, enabled: bool) -> Self {
        self.auto_positioning_enabled = enabled;
        self
    }

    /// Add a node with an explicit payload
    pub fn add_node(mut self, id: impl Into<String>, data: NodeData) -> Self {
        self.nodes
            .push(WorkflowNode::new(id, Position::default(), data));
        self
    }

    /// Add a Status node whose label and state name are both `name`
    pub fn add_status(self, id: impl Into<String>, name: &str) -> Self {
        self.add_node(
            id,
            NodeData::Status(StatusData {
                label: name.to_string(),
                business_event_name: (!name.is_empty()).then(|| name.to_string()),
            }),
        )
    }

    /// Add an Event node
    pub fn add_event(self, id: impl Into<String>, data: EventData) -> Self {
        self.add_node(id, NodeData::Event(data))
    }

    /// Set the position of the most recently added node
    pub fn at(mut self, x: f64, y: f64) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.position = Position::new(x, y);
        }
        self
    }

    /// Set the measured size of the most recently added node
    pub fn measured(mut self, width: f64, height: f64) -> Self {
        if let Some(node) = self.nodes.pop() {
            self.nodes.push(node.with_measured(width, height));
        }
        self
    }

    /// Add an edge between two nodes (ID follows the engine's scheme)
    pub fn add_edge(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.edges.push(WorkflowEdge::new(source, target));
        self
    }

    /// Add an edge with an explicit ID and no style
    pub fn add_edge_with_id(
        mut self,
        edge_id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.edges.push(WorkflowEdge {
            id: edge_id.into(),
            source: source.into(),
            target: target.into(),
            style: None,
        });
        self
    }

    /// Build the workflow, checking structural invariants
    pub fn build(self) -> Result<Workflow> {
        Workflow::from_parts(
            self.name,
            self.description,
            self.nodes,
            self.edges,
            self.auto_positioning_enabled,
        )
    }
}
