//! Error types for the workflow engine

use thiserror::Error;

use weft_providers::ProviderError;

/// Result type alias using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while executing a workflow
#[derive(Debug, Error)]
pub enum EngineError {
    /// The graph contains a cycle; the whole run is rejected
    #[error("Cycle detected in workflow graph involving: {0}")]
    CycleDetected(String),

    /// A node id referenced by the run does not exist in the graph
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// The node type is not in the registry
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    /// Required fields are neither connected nor set on the node
    #[error("Node '{node}' is missing required fields: {fields}")]
    MissingFields { node: String, fields: String },

    /// A semantically required input was empty at execution time
    #[error("Missing required input: {0}")]
    MissingInput(String),

    /// script-runner process failed
    #[error("Script failed: {0}")]
    ScriptFailed(String),

    /// Run was cancelled
    #[error("Execution cancelled")]
    Cancelled,

    /// Error from the provider layer
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error (script runner)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Create a script failure with a message
    pub fn script(msg: impl Into<String>) -> Self {
        Self::ScriptFailed(msg.into())
    }
}
