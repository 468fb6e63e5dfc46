//! Error types for the editor session

use thiserror::Error;
use workflow_graph::GraphError;

use crate::config::ConfigError;
use crate::events::EventError;

/// Result type alias using EditorError
pub type Result<T> = std::result::Result<T, EditorError>;

/// Errors raised by editor commands
#[derive(Debug, Error)]
pub enum EditorError {
    /// A graph operation was called with arguments that violate its contract
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The event sink refused an event
    #[error(transparent)]
    Event(#[from] EventError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A command that acts on the selection ran with nothing selected
    #[error("No node is selected")]
    NothingSelected,
}
