//! Workflow Editor - an interactive session over a workflow graph
//!
//! Wraps the pure operations of `workflow_graph` in a stateful session that a
//! canvas host can drive:
//!
//! - **Commands**: `EditorCommand` covers every user gesture (palette drop,
//!   "+" connector, connect, delete, side-panel edits, selection, save)
//! - **Events**: `EditorEvent`s report each change through an `EventSink`
//! - **Config**: `EditorConfig` holds the default workflow name, layout
//!   spacing and layout strategy, loaded from JSON
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use workflow_editor::{EditorCommand, EditorConfig, EditorSession, VecEventSink};
//! use workflow_graph::NodeType;
//!
//! let sink = Arc::new(VecEventSink::new());
//! let mut session = EditorSession::new(EditorConfig::default(), sink.clone());
//! session.dispatch(EditorCommand::AddConnectedNode {
//!     source_id: "start".to_string(),
//!     node_type: NodeType::Event,
//! })?;
//! assert_eq!(sink.events().len(), 3);
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod session;

pub use config::{ConfigError, EditorConfig};
pub use error::{EditorError, Result};
pub use events::{
    ChannelEventSink, EditorCommand, EditorEvent, EventError, EventSink, NullEventSink,
    VecEventSink,
};
pub use session::{CommandOutcome, EditorSession, SaveOutcome};
