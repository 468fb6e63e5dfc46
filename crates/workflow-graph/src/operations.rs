//! Graph mutations
//!
//! Every operation takes the current workflow by reference and returns a new
//! one; the input is never modified, so a caller never observes a half-applied
//! change. Contract violations (unknown IDs, touching Start) are `Err`; an
//! illegal connection is a `ConnectOutcome::Rejected`.

use serde::{Deserialize, Serialize};

use crate::connection::{allowed_pair, check_connection, ConnectionRejection};
use crate::constants::labels;
use crate::error::{GraphError, Result};
use crate::layout::{avoid_collisions, LayoutConfig};
use crate::types::{
    EdgeId, NodeData, NodeId, NodeType, Position, Workflow, WorkflowEdge, WorkflowNode,
};

/// Result of adding a node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeAdded {
    pub workflow: Workflow,
    /// ID of the new node
    pub node_id: NodeId,
    /// Edge created alongside the node, if any
    pub edge_id: Option<EdgeId>,
}

/// Result of a user-drawn connection
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectOutcome {
    Connected { workflow: Workflow, edge_id: EdgeId },
    /// Nothing changed; the connector snaps back
    Rejected(ConnectionRejection),
}

/// Partial update of a node's metadata
///
/// `None` leaves a field untouched. Setting a field the node type does not
/// carry is an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeDataPatch {
    pub label: Option<String>,
    pub business_event: Option<String>,
    pub business_event_name: Option<String>,
    pub condition: Option<String>,
    pub description: Option<String>,
    pub automatic_trigger: Option<bool>,
    pub external_trigger: Option<bool>,
    pub focal_entity: Option<String>,
    pub created_entities: Option<Vec<String>>,
    pub modified_entities: Option<Vec<String>>,
}

impl NodeDataPatch {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn business_event(mut self, value: impl Into<String>) -> Self {
        self.business_event = Some(value.into());
        self
    }

    pub fn business_event_name(mut self, value: impl Into<String>) -> Self {
        self.business_event_name = Some(value.into());
        self
    }

    pub fn condition(mut self, value: impl Into<String>) -> Self {
        self.condition = Some(value.into());
        self
    }

    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into());
        self
    }

    pub fn triggers(mut self, automatic: bool, external: bool) -> Self {
        self.automatic_trigger = Some(automatic);
        self.external_trigger = Some(external);
        self
    }

    pub fn focal_entity(mut self, value: impl Into<String>) -> Self {
        self.focal_entity = Some(value.into());
        self
    }

    pub fn created_entities(mut self, values: Vec<String>) -> Self {
        self.created_entities = Some(values);
        self
    }

    pub fn modified_entities(mut self, values: Vec<String>) -> Self {
        self.modified_entities = Some(values);
        self
    }

    /// Wire names of the fields this patch sets
    fn set_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        let mut mark = |set: bool, name: &'static str| {
            if set {
                fields.push(name);
            }
        };
        mark(self.label.is_some(), "label");
        mark(self.business_event.is_some(), "businessEvent");
        mark(self.business_event_name.is_some(), "businessEventName");
        mark(self.condition.is_some(), "condition");
        mark(self.description.is_some(), "description");
        mark(self.automatic_trigger.is_some(), "automaticTrigger");
        mark(self.external_trigger.is_some(), "externalTrigger");
        mark(self.focal_entity.is_some(), "focalEntity");
        mark(self.created_entities.is_some(), "createdEntities");
        mark(self.modified_entities.is_some(), "modifiedEntities");
        fields
    }

    /// Whether the patch sets nothing
    pub fn is_empty(&self) -> bool {
        self.set_fields().is_empty()
    }
}

fn applicable_fields(node_type: NodeType) -> &'static [&'static str] {
    match node_type {
        NodeType::Start => &["label"],
        NodeType::Status => &["label", "businessEventName"],
        NodeType::Event => &[
            "label",
            "businessEvent",
            "businessEventName",
            "condition",
            "description",
            "automaticTrigger",
            "externalTrigger",
            "focalEntity",
            "createdEntities",
            "modifiedEntities",
        ],
    }
}

/// Create the canonical single-Start workflow
pub fn create_initial_workflow() -> Workflow {
    Workflow::default()
}

/// Add a node from the palette with default spacing
pub fn add_node(
    workflow: &Workflow,
    node_type: NodeType,
    position_hint: Option<Position>,
) -> Result<NodeAdded> {
    add_node_with_config(workflow, node_type, position_hint, &LayoutConfig::default())
}

/// Add a node from the palette
///
/// With auto-positioning off, a position hint (the drop point) is used as is.
/// Otherwise the node goes right of Start (first node) or right of the
/// rightmost node with a small vertical jitter, moved down past any node it
/// would cover. With auto-positioning on, the rightmost node is also
/// connected to the new node when that connection is legal.
pub fn add_node_with_config(
    workflow: &Workflow,
    node_type: NodeType,
    position_hint: Option<Position>,
    config: &LayoutConfig,
) -> Result<NodeAdded> {
    if node_type == NodeType::Start {
        return Err(GraphError::StartNodeNotPlaceable);
    }

    let node_id = fresh_node_id(workflow, node_type);
    let size = config.fallback_size(node_type);
    let rightmost = rightmost_node(workflow);

    let position = match position_hint {
        Some(hint) if !workflow.auto_positioning_enabled => hint,
        _ => {
            let candidate = if workflow.is_empty() {
                workflow.start_node().position.offset(config.horizontal_offset, 0.0)
            } else {
                let jitter = ((workflow.steps().len() % 3) as f64 - 1.0) * config.drop_jitter;
                rightmost.position.offset(config.horizontal_offset, jitter)
            };
            avoid_collisions(workflow, config, candidate, size)
        }
    };

    let mut next = workflow.clone();
    next.push_node(WorkflowNode::new(
        node_id.clone(),
        position,
        NodeData::for_type(node_type, default_label(workflow, node_type)),
    ))?;

    let mut edge_id = None;
    if workflow.auto_positioning_enabled {
        match check_connection(&next, &rightmost.id, &node_id) {
            Ok(()) => {
                let edge = WorkflowEdge::new(rightmost.id.clone(), node_id.clone());
                edge_id = Some(edge.id.clone());
                next.push_edge(edge);
            }
            Err(reason) => {
                log::debug!(
                    "Not linking '{}' to new node '{}': {}",
                    rightmost.id,
                    node_id,
                    reason
                );
            }
        }
    }

    log::debug!("Added {} node '{}' at ({}, {})", node_type, node_id, position.x, position.y);
    Ok(NodeAdded {
        workflow: next,
        node_id,
        edge_id,
    })
}

/// Add a node through the "+" connector of `source_id`, with default spacing
pub fn add_connected_node(
    workflow: &Workflow,
    source_id: &str,
    node_type: NodeType,
) -> Result<NodeAdded> {
    add_connected_node_with_config(workflow, source_id, node_type, &LayoutConfig::default())
}

/// Add a node through the "+" connector of `source_id` and link it
///
/// Turns auto-positioning on. The k-th child of a source is placed
/// `ceil(k / 2)` sibling steps away from the source's row, odd k below and
/// even k above, then moved down past any node it would cover.
pub fn add_connected_node_with_config(
    workflow: &Workflow,
    source_id: &str,
    node_type: NodeType,
    config: &LayoutConfig,
) -> Result<NodeAdded> {
    let source = workflow.require_node(source_id)?;
    if node_type == NodeType::Start {
        return Err(GraphError::StartNodeNotPlaceable);
    }
    if !allowed_pair(source.node_type(), node_type) {
        return Err(GraphError::InvalidConnectedNodeType {
            source_id: source_id.to_string(),
            source_type: source.node_type(),
            requested: node_type,
        });
    }

    let node_id = fresh_node_id(workflow, node_type);
    let dx = if source.node_type() == NodeType::Event {
        config.event_horizontal_offset
    } else {
        config.horizontal_offset
    };
    let dy = sibling_offset(
        workflow.outgoing_edges(source_id).count(),
        config.sibling_vertical_step,
    );
    let position = avoid_collisions(
        workflow,
        config,
        source.position.offset(dx, dy),
        config.fallback_size(node_type),
    );

    let mut next = workflow.clone();
    next.auto_positioning_enabled = true;
    next.push_node(WorkflowNode::new(
        node_id.clone(),
        position,
        NodeData::for_type(node_type, default_label(workflow, node_type)),
    ))?;
    let edge = WorkflowEdge::new(source_id, node_id.clone());
    let edge_id = edge.id.clone();
    next.push_edge(edge);

    log::debug!("Added {} node '{}' after '{}'", node_type, node_id, source_id);
    Ok(NodeAdded {
        workflow: next,
        node_id,
        edge_id: Some(edge_id),
    })
}

/// Vertical offset of the k-th child (0-indexed) from its parent's row
pub fn sibling_offset(index: usize, step: f64) -> f64 {
    let distance = index.div_ceil(2) as f64 * step;
    if index % 2 == 1 {
        distance
    } else {
        -distance
    }
}

/// Delete a node and every edge touching it
///
/// Deleting the last non-Start node resets the workflow to the single Start
/// node at its anchor.
pub fn delete_node(workflow: &Workflow, node_id: &str) -> Result<Workflow> {
    let node = workflow.require_node(node_id)?;
    if node.is_start() {
        return Err(GraphError::StartNodeImmutable(node_id.to_string()));
    }

    let mut next = workflow.clone();
    if workflow.steps().len() == 1 {
        log::debug!("Deleting last node '{}', resetting to Start", node_id);
        next.reset_to_start();
    } else {
        next.remove_node(node_id)?;
    }
    Ok(next)
}

/// Delete a single edge
pub fn delete_edge(workflow: &Workflow, edge_id: &str) -> Result<Workflow> {
    let mut next = workflow.clone();
    next.remove_edge(edge_id)?;
    Ok(next)
}

/// Connect two existing nodes if the connection rules allow it
pub fn connect(workflow: &Workflow, source: &str, target: &str) -> Result<ConnectOutcome> {
    workflow.require_node(source)?;
    workflow.require_node(target)?;

    if let Err(reason) = check_connection(workflow, source, target) {
        log::debug!("Rejected connection {} -> {}: {}", source, target, reason);
        return Ok(ConnectOutcome::Rejected(reason));
    }

    let edge = WorkflowEdge::new(source, target);
    let edge_id = edge.id.clone();
    let mut next = workflow.clone();
    next.push_edge(edge);
    Ok(ConnectOutcome::Connected {
        workflow: next,
        edge_id,
    })
}

/// Apply a metadata patch to a node
pub fn update_node_data(
    workflow: &Workflow,
    node_id: &str,
    patch: &NodeDataPatch,
) -> Result<Workflow> {
    let node_type = workflow.require_node(node_id)?.node_type();
    let allowed = applicable_fields(node_type);
    if let Some(field) = patch.set_fields().into_iter().find(|f| !allowed.contains(f)) {
        return Err(GraphError::FieldNotApplicable {
            node_id: node_id.to_string(),
            node_type,
            field,
        });
    }

    let mut next = workflow.clone();
    let node = next
        .find_node_mut(node_id)
        .ok_or_else(|| GraphError::node_not_found(node_id))?;
    apply_patch(&mut node.data, patch);
    next.refresh_derived();
    Ok(next)
}

fn apply_patch(data: &mut NodeData, patch: &NodeDataPatch) {
    fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
        if let Some(value) = value {
            *slot = value.clone();
        }
    }
    fn set_opt(slot: &mut Option<String>, value: &Option<String>) {
        if let Some(value) = value {
            *slot = Some(value.clone());
        }
    }

    match data {
        NodeData::Start(d) => set(&mut d.label, &patch.label),
        NodeData::Status(d) => {
            set(&mut d.label, &patch.label);
            set_opt(&mut d.business_event_name, &patch.business_event_name);
        }
        NodeData::Event(d) => {
            set(&mut d.label, &patch.label);
            set_opt(&mut d.business_event, &patch.business_event);
            set_opt(&mut d.business_event_name, &patch.business_event_name);
            set_opt(&mut d.condition, &patch.condition);
            set_opt(&mut d.description, &patch.description);
            set(&mut d.automatic_trigger, &patch.automatic_trigger);
            set(&mut d.external_trigger, &patch.external_trigger);
            set_opt(&mut d.focal_entity, &patch.focal_entity);
            set(&mut d.created_entities, &patch.created_entities);
            set(&mut d.modified_entities, &patch.modified_entities);
        }
    }
}

/// Node with the largest x; the first one wins ties
fn rightmost_node(workflow: &Workflow) -> &WorkflowNode {
    workflow.nodes().fold(workflow.start_node(), |best, node| {
        if node.position.x > best.position.x {
            node
        } else {
            best
        }
    })
}

/// `{type}-{millis}`, bumped past any ID already in the workflow
fn fresh_node_id(workflow: &Workflow, node_type: NodeType) -> NodeId {
    let mut stamp = chrono::Utc::now().timestamp_millis();
    loop {
        let candidate = format!("{}-{}", node_type, stamp);
        if workflow.find_node(&candidate).is_none() {
            return candidate;
        }
        stamp += 1;
    }
}

/// "Stage", "Stage1", "Stage2", ... for Status nodes; empty for Events
fn default_label(workflow: &Workflow, node_type: NodeType) -> String {
    match node_type {
        NodeType::Status => {
            let taken = |label: &str| workflow.nodes().any(|n| n.data.label() == label);
            if !taken(labels::STATUS_BASE) {
                return labels::STATUS_BASE.to_string();
            }
            (1..)
                .map(|n| format!("{}{}", labels::STATUS_BASE, n))
                .find(|label| !taken(label))
                .unwrap_or_default()
        }
        NodeType::Event => String::new(),
        NodeType::Start => labels::START.to_string(),
    }
}
