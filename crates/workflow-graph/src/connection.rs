//! Connection legality
//!
//! Decides whether a proposed edge may be drawn. A refused connection is not an
//! error: the canvas snaps the connector back and nothing changes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{NodeType, Workflow};

/// Why a proposed connection was refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum ConnectionRejection {
    /// One of the endpoints does not exist
    UnknownEndpoint { node_id: String },
    /// Source and target are the same node
    SelfLoop,
    /// An edge already joins the two nodes, in either direction
    AlreadyConnected,
    /// The pair of node types may not be joined
    DisallowedPair { source: NodeType, target: NodeType },
}

impl fmt::Display for ConnectionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEndpoint { node_id } => write!(f, "unknown node '{}'", node_id),
            Self::SelfLoop => write!(f, "a node cannot connect to itself"),
            Self::AlreadyConnected => write!(f, "the nodes are already connected"),
            Self::DisallowedPair { source, target } => {
                write!(f, "{} nodes cannot connect to {} nodes", source, target)
            }
        }
    }
}

/// Whether an edge may join nodes of these two types
///
/// The allowed pairs are Start/Event and Event/Status, in either direction.
pub fn allowed_pair(source: NodeType, target: NodeType) -> bool {
    matches!(
        (source, target),
        (NodeType::Start, NodeType::Event)
            | (NodeType::Event, NodeType::Start)
            | (NodeType::Event, NodeType::Status)
            | (NodeType::Status, NodeType::Event)
    )
}

/// Check a proposed edge against the workflow, naming the first reason it fails
pub fn check_connection(
    workflow: &Workflow,
    source: &str,
    target: &str,
) -> Result<(), ConnectionRejection> {
    let source_node = workflow
        .find_node(source)
        .ok_or_else(|| ConnectionRejection::UnknownEndpoint {
            node_id: source.to_string(),
        })?;
    let target_node = workflow
        .find_node(target)
        .ok_or_else(|| ConnectionRejection::UnknownEndpoint {
            node_id: target.to_string(),
        })?;

    if source == target {
        return Err(ConnectionRejection::SelfLoop);
    }

    if workflow.has_edge_between(source, target) {
        return Err(ConnectionRejection::AlreadyConnected);
    }

    let (source_type, target_type) = (source_node.node_type(), target_node.node_type());
    if !allowed_pair(source_type, target_type) {
        return Err(ConnectionRejection::DisallowedPair {
            source: source_type,
            target: target_type,
        });
    }

    Ok(())
}

/// Whether a proposed edge may be drawn
pub fn is_valid_connection(workflow: &Workflow, source: &str, target: &str) -> bool {
    check_connection(workflow, source, target).is_ok()
}
