//! Transient interaction state
//!
//! Selection, highlighting and the in-progress connection drag live here,
//! beside the workflow rather than on its nodes. Nothing in this module is
//! ever serialized with the workflow.

use serde::{Deserialize, Serialize};

use crate::connection::is_valid_connection;
use crate::constants::viewport;
use crate::error::{GraphError, Result};
use crate::layout::LayoutConfig;
use crate::types::{EdgeId, NodeId, NodeType, Size, Workflow};

/// Nodes and edges drawn emphasized on the canvas
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub node_ids: Vec<NodeId>,
    pub edge_ids: Vec<EdgeId>,
}

impl Highlight {
    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty() && self.edge_ids.is_empty()
    }
}

/// Connector styling for one node while a connection is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleState {
    pub is_connecting: bool,
    pub connection_source_type: Option<NodeType>,
    /// Whether dropping the drag on this node would create an edge
    pub is_valid_target: bool,
}

/// Selection, highlight and connection-drag state of an editor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionState {
    selected: Option<NodeId>,
    highlight: Highlight,
    connection_source: Option<NodeId>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_node(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn highlight(&self) -> &Highlight {
        &self.highlight
    }

    pub fn connection_source(&self) -> Option<&str> {
        self.connection_source.as_deref()
    }

    /// Select a node and highlight it with its touching edges
    ///
    /// The Start node cannot be selected; asking for it clears the selection
    /// and returns `false`.
    pub fn select_node(&mut self, workflow: &Workflow, node_id: &str) -> Result<bool> {
        let node = workflow.require_node(node_id)?;
        if node.is_start() {
            self.clear_selection();
            return Ok(false);
        }
        self.selected = Some(node_id.to_string());
        self.highlight = Highlight {
            node_ids: vec![node_id.to_string()],
            edge_ids: workflow
                .edges()
                .iter()
                .filter(|e| e.touches(node_id))
                .map(|e| e.id.clone())
                .collect(),
        };
        Ok(true)
    }

    /// Highlight an edge and its endpoints; clears the node selection
    pub fn select_edge(&mut self, workflow: &Workflow, edge_id: &str) -> Result<()> {
        let edge = workflow
            .find_edge(edge_id)
            .ok_or_else(|| GraphError::EdgeNotFound(edge_id.to_string()))?;
        self.selected = None;
        self.highlight = Highlight {
            node_ids: vec![edge.source.clone(), edge.target.clone()],
            edge_ids: vec![edge.id.clone()],
        };
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.highlight = Highlight::default();
    }

    /// Start dragging a connection out of a node
    pub fn begin_connection(&mut self, workflow: &Workflow, source_id: &str) -> Result<()> {
        workflow.require_node(source_id)?;
        self.connection_source = Some(source_id.to_string());
        Ok(())
    }

    /// Drop the in-progress connection drag
    pub fn end_connection(&mut self) {
        self.connection_source = None;
    }

    /// Connector state of a node given the current drag
    pub fn handle_state(&self, workflow: &Workflow, node_id: &str) -> HandleState {
        let Some(source_id) = self.connection_source.as_deref() else {
            return HandleState::default();
        };
        HandleState {
            is_connecting: true,
            connection_source_type: workflow.find_node(source_id).map(|n| n.node_type()),
            is_valid_target: is_valid_connection(workflow, source_id, node_id),
        }
    }

    /// Forget references to nodes and edges that no longer exist
    pub fn retain_existing(&mut self, workflow: &Workflow) {
        if let Some(id) = &self.selected {
            if workflow.find_node(id).is_none() {
                self.clear_selection();
            }
        }
        self.highlight
            .node_ids
            .retain(|id| workflow.find_node(id).is_some());
        self.highlight
            .edge_ids
            .retain(|id| workflow.find_edge(id).is_some());
        if let Some(id) = &self.connection_source {
            if workflow.find_node(id).is_none() {
                self.connection_source = None;
            }
        }
    }
}

/// Canvas transform that centers content: screen = canvas * zoom + (x, y)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

/// Viewport centering every node of the workflow on a canvas of the given size
///
/// Zooms in more aggressively than a plain fit, within `[0.5, 1.5]`.
pub fn focus_viewport(workflow: &Workflow, canvas: Size, config: &LayoutConfig) -> Viewport {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for node in workflow.nodes() {
        let size = config.node_size(node);
        min_x = min_x.min(node.position.x);
        min_y = min_y.min(node.position.y);
        max_x = max_x.max(node.position.x + size.width);
        max_y = max_y.max(node.position.y + size.height);
    }

    let (width, height) = (max_x - min_x, max_y - min_y);
    let zoom_x = (canvas.width - viewport::FOCUS_PADDING * 2.0) / width;
    let zoom_y = (canvas.height - viewport::FOCUS_PADDING * 2.0) / height;
    let zoom = zoom_x
        .min(zoom_y)
        .min(viewport::MAX_ZOOM)
        .max(viewport::MIN_ZOOM);

    let center_x = (min_x + max_x) / 2.0;
    let center_y = (min_y + max_y) / 2.0;
    Viewport {
        x: canvas.width / 2.0 - center_x * zoom,
        y: canvas.height / 2.0 - center_y * zoom,
        zoom,
    }
}
