//! Commands into and events out of an editor session
//!
//! The host (canvas, side panel, toolbar) drives a session with
//! `EditorCommand`s and learns what changed from `EditorEvent`s delivered to
//! an `EventSink`. Both are plain serde types so they can cross an IPC or
//! webview boundary as JSON.

use serde::{Deserialize, Serialize};
use workflow_graph::{
    ConnectionRejection, Highlight, LayoutKind, NodeDataPatch, NodeType, Position, SaveIntent,
    ValidationMode, ValidationResult, WorkflowPayload,
};

/// Trait for delivering editor events
///
/// This abstracts over the transport (in-process channel, webview bridge,
/// test collector) so the session can be embedded anywhere.
pub trait EventSink: Send + Sync {
    /// Send an event
    ///
    /// Returns an error if the event could not be delivered (e.g., channel closed)
    fn send(&self, event: EditorEvent) -> Result<(), EventError>;
}

/// Error when sending events fails
#[derive(Debug, Clone, thiserror::Error)]
#[error("Event error: {message}")]
pub struct EventError {
    pub message: String,
}

impl EventError {
    pub fn channel_closed() -> Self {
        Self {
            message: "Channel closed".to_string(),
        }
    }
}

/// Requests a host can make of an editor session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum EditorCommand {
    /// Palette drop
    #[serde(rename_all = "camelCase")]
    AddNode {
        node_type: NodeType,
        #[serde(default)]
        position: Option<Position>,
    },
    /// "+" connector on an existing node
    #[serde(rename_all = "camelCase")]
    AddConnectedNode { source_id: String, node_type: NodeType },
    DeleteSelected,
    #[serde(rename_all = "camelCase")]
    DeleteNode { node_id: String },
    #[serde(rename_all = "camelCase")]
    DeleteEdge { edge_id: String },
    Connect { source: String, target: String },
    /// Side-panel edit of the selected node
    UpdateSelected { patch: NodeDataPatch },
    #[serde(rename_all = "camelCase")]
    SelectNode { node_id: String },
    #[serde(rename_all = "camelCase")]
    SelectEdge { edge_id: String },
    ClearSelection,
    #[serde(rename_all = "camelCase")]
    BeginConnection { source_id: String },
    EndConnection,
    SetName { name: String },
    SetDescription { description: String },
    SetAutoPositioning { enabled: bool },
    RecomputeLayout,
    Validate { mode: ValidationMode },
    SaveDraft,
    Publish,
}

/// Events emitted by an editor session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorEvent {
    /// A node was created, possibly with a connecting edge
    #[serde(rename_all = "camelCase")]
    NodeAdded {
        node_id: String,
        node_type: NodeType,
        edge_id: Option<String>,
    },

    /// A node was removed; `reset` is true when the graph fell back to Start only
    #[serde(rename_all = "camelCase")]
    NodeDeleted { node_id: String, reset: bool },

    /// Node metadata changed
    #[serde(rename_all = "camelCase")]
    NodeUpdated { node_id: String },

    /// A user-drawn connection created an edge
    #[serde(rename_all = "camelCase")]
    EdgeAdded {
        edge_id: String,
        source: String,
        target: String,
    },

    #[serde(rename_all = "camelCase")]
    EdgeDeleted { edge_id: String },

    /// A proposed connection was refused; nothing changed
    ConnectionRejected {
        source: String,
        target: String,
        reason: ConnectionRejection,
    },

    /// Selection or highlight changed
    #[serde(rename_all = "camelCase")]
    SelectionChanged {
        selected_node: Option<String>,
        highlight: Highlight,
    },

    /// A connection drag started (`Some`) or ended (`None`)
    ConnectionDragChanged { source: Option<String> },

    /// The canvas should center and zoom on this node
    #[serde(rename_all = "camelCase")]
    FocusRequested { node_id: String },

    /// Workflow name or description changed
    MetadataChanged { name: String, description: String },

    AutoPositioningChanged { enabled: bool },

    /// Node positions were recomputed
    LayoutApplied { strategy: LayoutKind },

    /// A validation pass finished
    Validated {
        mode: ValidationMode,
        result: ValidationResult,
    },

    /// Save or publish produced a payload
    Saved {
        intent: SaveIntent,
        payload: WorkflowPayload,
    },

    /// Save or publish was refused because of validation errors
    SaveBlocked {
        intent: SaveIntent,
        result: ValidationResult,
    },
}

/// A no-op event sink that discards all events
///
/// Useful when only the returned results matter.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: EditorEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// A vector-based event sink that collects events
///
/// Useful for testing to verify events were emitted correctly.
pub struct VecEventSink {
    events: parking_lot::Mutex<Vec<EditorEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self {
            events: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Get all collected events
    pub fn events(&self) -> Vec<EditorEvent> {
        self.events.lock().clone()
    }

    /// Take all collected events, leaving the sink empty
    pub fn drain(&self) -> Vec<EditorEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Clear all collected events
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Default for VecEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: EditorEvent) -> Result<(), EventError> {
        self.events.lock().push(event);
        Ok(())
    }
}

/// An event sink that forwards events over a std mpsc channel
pub struct ChannelEventSink {
    sender: std::sync::mpsc::Sender<EditorEvent>,
}

impl ChannelEventSink {
    pub fn new(sender: std::sync::mpsc::Sender<EditorEvent>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelEventSink {
    fn send(&self, event: EditorEvent) -> Result<(), EventError> {
        self.sender
            .send(event)
            .map_err(|_| EventError::channel_closed())
    }
}
