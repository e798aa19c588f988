//! Required-field validation
//!
//! Before a non-skipped node runs, every field its type marks as required
//! must be satisfied either by a connected edge on that port or by a
//! non-empty literal in the node's data. The orchestrator turns a
//! non-empty missing list into a per-node failure and keeps running.

use serde_json::Value;

use crate::types::{GraphNode, NodeDefinition, WorkflowGraph};

/// A literal counts only if it actually holds something
fn is_satisfying(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

/// List the required fields a node is missing
pub fn missing_fields(
    node: &GraphNode,
    graph: &WorkflowGraph,
    definition: &NodeDefinition,
) -> Vec<String> {
    definition
        .required_fields
        .iter()
        .filter(|field| {
            let connected = graph.has_edge_to(&node.id, field);
            let literal = is_satisfying(node.data.get(field.as_str()));
            !connected && !literal
        })
        .cloned()
        .collect()
}
