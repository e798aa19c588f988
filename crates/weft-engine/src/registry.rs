//! Node registry
//!
//! Maps every catalog kind to its handler. Built once at startup; the
//! orchestrator looks handlers up by the node's kind and reads port and
//! required-field schemas off the handler's definition.

use std::collections::HashMap;
use std::sync::Arc;

use crate::nodes::{GenerateNode, InputNode, NodeHandler, PreviewNode, ScriptRunnerNode};
use crate::types::{NodeDefinition, NodeKind};

pub struct NodeRegistry {
    handlers: HashMap<NodeKind, Arc<dyn NodeHandler>>,
}

impl NodeRegistry {
    /// Build the registry with the full node catalog
    pub fn new() -> Self {
        let mut handlers: HashMap<NodeKind, Arc<dyn NodeHandler>> = HashMap::new();
        for kind in NodeKind::ALL {
            let handler: Arc<dyn NodeHandler> = if kind.is_generator() {
                Arc::new(GenerateNode::new(kind))
            } else if kind.is_input() {
                Arc::new(InputNode::new(kind))
            } else if kind.is_preview() {
                Arc::new(PreviewNode::new(kind))
            } else {
                Arc::new(ScriptRunnerNode::new())
            };
            handlers.insert(kind, handler);
        }
        Self { handlers }
    }

    /// Look up the handler for a node kind
    pub fn handler(&self, kind: NodeKind) -> Option<&Arc<dyn NodeHandler>> {
        self.handlers.get(&kind)
    }

    /// Look up a kind's definition (ports, required fields)
    pub fn definition(&self, kind: NodeKind) -> Option<&NodeDefinition> {
        self.handlers.get(&kind).map(|h| h.definition())
    }

    /// All definitions, for exposing the catalog to a canvas
    pub fn definitions(&self) -> Vec<&NodeDefinition> {
        let mut all: Vec<&NodeDefinition> = self.handlers.values().map(|h| h.definition()).collect();
        all.sort_by_key(|d| d.kind.as_str());
        all
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
