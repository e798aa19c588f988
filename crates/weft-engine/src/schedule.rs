//! Topological scheduling
//!
//! Kahn's algorithm over the node/edge list, with ties among independent
//! nodes broken by original declaration order so runs are deterministic.
//! Cycles (including self-loops) reject the whole run; nothing is silently
//! dropped.

use std::collections::HashMap;

use crate::error::{EngineError, Result};
use crate::types::WorkflowGraph;

/// Compute the execution order for a graph
///
/// Every node appears after all nodes with an edge into it. Edges whose
/// endpoints are not in the node list are ignored.
pub fn execution_order(graph: &WorkflowGraph) -> Result<Vec<String>> {
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    for node in &graph.nodes {
        in_degree.insert(&node.id, 0);
    }

    for edge in &graph.edges {
        if !in_degree.contains_key(edge.source.as_str()) {
            continue;
        }
        if let Some(degree) = in_degree.get_mut(edge.target.as_str()) {
            *degree += 1;
        }
    }

    let mut order = Vec::with_capacity(graph.nodes.len());
    let mut placed: HashMap<&str, bool> = graph.nodes.iter().map(|n| (n.id.as_str(), false)).collect();

    // Repeatedly take the first unplaced zero-degree node in declaration
    // order. Quadratic, but canvas graphs are small and the order is stable.
    while order.len() < graph.nodes.len() {
        let next = graph.nodes.iter().find(|n| {
            !placed[n.id.as_str()] && in_degree[n.id.as_str()] == 0
        });

        let Some(node) = next else {
            let stuck: Vec<&str> = graph
                .nodes
                .iter()
                .filter(|n| !placed[n.id.as_str()])
                .map(|n| n.id.as_str())
                .collect();
            return Err(EngineError::CycleDetected(stuck.join(", ")));
        };

        placed.insert(&node.id, true);
        order.push(node.id.clone());

        for edge in &graph.edges {
            if edge.source == node.id {
                if let Some(degree) = in_degree.get_mut(edge.target.as_str()) {
                    *degree = degree.saturating_sub(1);
                }
            }
        }
    }

    Ok(order)
}
