//! Per-run execution context
//!
//! Holds the values produced so far, keyed node id -> port id -> value,
//! with a `"default"` slot for each node's primary output. Created empty
//! at run start, grows monotonically, discarded at run end. Written only
//! by the orchestrator between nodes, so no locking is needed under the
//! sequential model.

use std::collections::HashMap;

use serde_json::Value;
use weft_providers::CancelToken;

/// Port id of the primary output slot
pub const DEFAULT_PORT: &str = "default";

/// State for one workflow run
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Unique identifier for this run
    pub run_id: String,
    /// Cooperative cancellation flag, shared with pollers
    pub cancel: CancelToken,
    values: HashMap<String, HashMap<String, Value>>,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            cancel: CancelToken::new(),
            values: HashMap::new(),
        }
    }

    /// Check if the run has been cancelled
    pub fn is_aborted(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Value a node produced on a port, if any
    pub fn get(&self, node_id: &str, port_id: &str) -> Option<&Value> {
        self.values.get(node_id)?.get(port_id)
    }

    /// A node's primary output
    pub fn get_default(&self, node_id: &str) -> Option<&Value> {
        self.get(node_id, DEFAULT_PORT)
    }

    /// Record a node's outputs after it completes
    pub fn record(&mut self, node_id: &str, outputs: HashMap<String, Value>) {
        self.values
            .entry(node_id.to_string())
            .or_default()
            .extend(outputs);
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
