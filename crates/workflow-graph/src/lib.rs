//! Workflow Graph - the engine behind the visual workflow editor
//!
//! Users drag Start, Status and Event nodes onto a canvas, connect them under
//! type rules, fill in per-node business metadata and validate the graph before
//! saving a draft or publishing. This crate holds everything that does not
//! depend on a rendering surface:
//!
//! - **Data model**: `Workflow`, `WorkflowNode` with a typed `NodeData` payload,
//!   `WorkflowEdge`
//! - **Connection rules**: which typed node pairs may be joined
//! - **Mutations**: palette drop, "+" connector, delete, connect, metadata edits
//! - **Auto-layout**: BFS leveling plus interchangeable placement strategies
//! - **Validation**: mode-sensitive (save vs. publish) issue collection
//!
//! Every operation is a pure, synchronous function of its inputs. Mutations
//! return a fresh `Workflow` instead of patching the caller's copy in place,
//! so layout and validation never observe a half-applied change.
//!
//! # Example
//!
//! ```ignore
//! use workflow_graph::{operations, validate_workflow, NodeType, ValidationMode, Workflow};
//!
//! let workflow = Workflow::new("Loan Onboarding");
//! let start_id = workflow.start_node().id.clone();
//! let added = operations::add_connected_node(&workflow, &start_id, NodeType::Event)?;
//! let result = validate_workflow(&added.workflow, ValidationMode::Save);
//! assert!(!result.is_valid);
//! ```

pub mod builder;
pub mod connection;
pub mod constants;
pub mod error;
pub mod feedback;
pub mod interaction;
pub mod layout;
pub mod operations;
pub mod serialization;
pub mod types;
pub mod validation;

// Re-export key types
pub use builder::WorkflowBuilder;
pub use connection::{check_connection, is_valid_connection, ConnectionRejection};
pub use error::{GraphError, Result};
pub use feedback::{NodeValidationGroup, ValidationFeedback};
pub use interaction::{focus_viewport, HandleState, Highlight, InteractionState, Viewport};
pub use layout::{
    recompute_layout, recompute_layout_with, CompactLayout, GridLayout, LayoutConfig, LayoutKind,
    LayoutStrategy,
};
pub use operations::{ConnectOutcome, NodeAdded, NodeDataPatch};
pub use serialization::{deserialize, serialize, SaveIntent, WorkflowPayload};
pub use types::{
    EdgeId, EventData, NodeData, NodeId, NodeType, Position, Size, StartData, StatusData,
    Workflow, WorkflowEdge, WorkflowNode, START_NODE_ID,
};
pub use validation::{
    validate_workflow, ValidationErrorType, ValidationIssue, ValidationMode, ValidationResult,
    ValidationSeverity,
};
