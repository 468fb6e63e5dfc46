//! Error types for the workflow graph engine
//!
//! These are contract violations: a caller asked for something that cannot
//! happen in a well-formed editor (deleting an unknown node, adding a second
//! Start, ...). User-facing problems with the graph are reported by the
//! validator as data, and illegal connections are a plain rejection.

use thiserror::Error;

use crate::types::{NodeId, NodeType};

/// Result type alias using GraphError
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised by graph operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// No node with this ID exists in the workflow
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// No edge with this ID exists in the workflow
    #[error("Edge not found: {0}")]
    EdgeNotFound(String),

    /// The Start node cannot be deleted or replaced
    #[error("The Start node '{0}' cannot be deleted or modified this way")]
    StartNodeImmutable(NodeId),

    /// A second Start node was requested
    #[error("A workflow has exactly one Start node; another cannot be added")]
    StartNodeNotPlaceable,

    /// The workflow does not hold exactly one Start node
    #[error("Expected exactly one Start node, found {0}")]
    StartNodeCount(usize),

    /// The "+" connector was asked for a node type that cannot follow the source
    #[error("Cannot attach a {requested} node to {source_type} node '{source_id}'")]
    InvalidConnectedNodeType {
        source_id: NodeId,
        source_type: NodeType,
        requested: NodeType,
    },

    /// A metadata patch touched a field the node type does not carry
    #[error("Field '{field}' does not apply to {node_type} node '{node_id}'")]
    FieldNotApplicable {
        node_id: NodeId,
        node_type: NodeType,
        field: &'static str,
    },

    /// Two nodes share an ID
    #[error("Duplicate node ID: {0}")]
    DuplicateNodeId(NodeId),

    /// Two edges share an ID or join the same pair of nodes
    #[error("Duplicate edge '{edge_id}' between '{source_id}' and '{target_id}'")]
    DuplicateEdge {
        edge_id: String,
        source_id: NodeId,
        target_id: NodeId,
    },

    /// An edge starts and ends on the same node
    #[error("Edge '{edge_id}' connects node '{node_id}' to itself")]
    SelfLoop { edge_id: String, node_id: NodeId },

    /// An edge references a node that does not exist
    #[error("Edge '{edge_id}' references unknown node '{node_id}'")]
    DanglingEdge { edge_id: String, node_id: NodeId },
}

impl GraphError {
    /// Create a node-not-found error
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound(id.into())
    }
}
