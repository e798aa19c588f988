//! Node handlers
//!
//! One handler implementation per catalog entry, registered at startup in
//! `NodeRegistry`. Handlers translate resolved inputs plus node
//! configuration into work: generators build a `GenerationRequest` for the
//! provider seam, inputs and previews just re-normalize and pass values
//! through, and the script runner shells out.

pub mod generate;
pub mod input;
pub mod preview;
pub mod script;

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use weft_providers::{CancelToken, GenerationClient};

use crate::error::{EngineError, Result};
use crate::types::{GraphNode, NodeDefinition};

pub use generate::GenerateNode;
pub use input::InputNode;
pub use preview::PreviewNode;
pub use script::ScriptRunnerNode;

/// Resolved inputs for node execution
pub type NodeInputs = HashMap<String, Value>;

/// Outputs produced by node execution
pub type NodeOutputs = HashMap<String, Value>;

/// Collaborators a handler may call during execution
pub struct NodeServices<'a> {
    /// Seam to the provider layer
    pub client: &'a dyn GenerationClient,
    /// Cooperative cancellation, shared with pollers
    pub cancel: &'a CancelToken,
}

/// The core trait all node handlers implement
#[async_trait]
pub trait NodeHandler: Send + Sync {
    /// The node type's definition (ports, required fields)
    fn definition(&self) -> &NodeDefinition;

    /// Execute with resolved inputs, producing port values
    ///
    /// The `"default"` output slot must carry the node's primary output.
    async fn execute(
        &self,
        node: &GraphNode,
        inputs: &NodeInputs,
        services: &NodeServices<'_>,
    ) -> Result<NodeOutputs>;
}

/// Helper trait for extracting typed values from NodeInputs
pub trait InputsExt {
    /// Get a required string input
    fn get_string(&self, key: &str) -> Result<&str>;

    /// Get an optional string input
    fn get_string_opt(&self, key: &str) -> Option<&str>;

    /// Get an optional number input
    fn get_f64_opt(&self, key: &str) -> Option<f64>;

    /// Get an optional integer input
    fn get_u32_opt(&self, key: &str) -> Option<u32>;
}

impl InputsExt for NodeInputs {
    fn get_string(&self, key: &str) -> Result<&str> {
        self.get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| EngineError::MissingInput(key.to_string()))
    }

    fn get_string_opt(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    fn get_f64_opt(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.as_f64())
    }

    fn get_u32_opt(&self, key: &str) -> Option<u32> {
        self.get(key).and_then(|v| v.as_u64()).map(|n| n as u32)
    }
}

/// Build an outputs map with the primary value mirrored into `"default"`
pub(crate) fn with_default(port: &str, value: Value) -> NodeOutputs {
    let mut outputs = NodeOutputs::new();
    outputs.insert("default".to_string(), value.clone());
    outputs.insert(port.to_string(), value);
    outputs
}
