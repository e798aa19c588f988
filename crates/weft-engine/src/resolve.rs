//! Input resolution
//!
//! For a node about to execute: seed the inputs map with the node's own
//! literals, then walk its incoming edges. Each edge value comes from the
//! run context (exact port, then the producer's `"default"` slot) or, when
//! the producer never wrote - e.g. it was skipped - from a best-effort read
//! of the producer's property bag using the expected type as a hint. Values
//! are normalized to the target port's type and multiple edges into one
//! port merge in edge order.

use std::collections::HashSet;

use serde_json::Value;

use crate::context::{RunContext, DEFAULT_PORT};
use crate::nodes::NodeInputs;
use crate::normalize::{merge, normalize};
use crate::types::{GraphNode, NodeDefinition, PortDataType, WorkflowGraph};

/// Best-effort value extraction from a node's property bag
///
/// Used when the producer has no recorded output, and for the skip
/// short-circuit ("emit whatever the node already holds").
pub fn extract_hint(data: &Value, hint: PortDataType) -> Value {
    let Some(obj) = data.as_object() else {
        return Value::Null;
    };

    let keys: &[&str] = match hint {
        PortDataType::Text => &["text", "prompt", "value", "output"],
        PortDataType::Image => &["image", "images", "url", "output"],
        PortDataType::Video => &["video", "url", "output"],
        PortDataType::Model3d => &["model", "model_url", "file", "url", "output"],
        PortDataType::Any => &["value", "output"],
    };

    for key in keys {
        if let Some(value) = obj.get(*key) {
            if !value.is_null() {
                return value.clone();
            }
        }
    }
    Value::Null
}

/// Build the resolved inputs map for a node
pub fn resolve_inputs(
    graph: &WorkflowGraph,
    node: &GraphNode,
    context: &RunContext,
    definition: Option<&NodeDefinition>,
) -> NodeInputs {
    let mut inputs = NodeInputs::new();

    // Literals first; edges override them
    if let Some(obj) = node.data.as_object() {
        for (key, value) in obj {
            inputs.insert(key.clone(), value.clone());
        }
    }

    let mut edge_written: HashSet<String> = HashSet::new();

    for edge in graph.incoming_edges(&node.id) {
        let expected = definition
            .and_then(|d| d.input_port(&edge.target_handle))
            .map(|p| p.data_type)
            .unwrap_or(PortDataType::Any);

        let raw = context
            .get(&edge.source, &edge.source_handle)
            .or_else(|| context.get_default(&edge.source))
            .cloned()
            .unwrap_or_else(|| {
                graph
                    .find_node(&edge.source)
                    .map(|source| extract_hint(&source.data, expected))
                    .unwrap_or(Value::Null)
            });

        let value = normalize(raw, expected);
        if value.is_null() {
            continue;
        }

        let port = edge.target_handle.clone();
        if edge_written.contains(&port) {
            let existing = inputs.remove(&port).unwrap_or(Value::Null);
            inputs.insert(port, merge(existing, value, expected));
        } else {
            inputs.insert(port.clone(), value);
            edge_written.insert(port);
        }
    }

    // Legacy convenience keys for handlers that read by type, in schema order
    if let Some(definition) = definition {
        for port in &definition.inputs {
            let Some(key) = port.data_type.legacy_key() else {
                continue;
            };
            if key == port.id || !inputs.contains_key(&port.id) {
                continue;
            }
            if !inputs.contains_key(key) {
                let value = inputs[&port.id].clone();
                inputs.insert(key.to_string(), value);
            }
        }
    }

    inputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NodeRegistry;
    use crate::types::{GraphEdge, NodeKind};
    use serde_json::json;
    use std::collections::HashMap;

    fn record(context: &mut RunContext, node_id: &str, port: &str, value: Value) {
        let mut outputs = HashMap::new();
        outputs.insert(port.to_string(), value.clone());
        outputs.insert(DEFAULT_PORT.to_string(), value);
        context.record(node_id, outputs);
    }

    fn definition(kind: NodeKind) -> NodeDefinition {
        NodeRegistry::new().definition(kind).unwrap().clone()
    }

    #[test]
    fn test_literals_seed_the_map() {
        let node = GraphNode::new("gen", NodeKind::ImageGen)
            .with_data(json!({"prompt": "a cat", "model": "nanobanana"}));
        let graph = WorkflowGraph::new(vec![node.clone()], vec![]);

        let inputs = resolve_inputs(
            &graph,
            &node,
            &RunContext::new(),
            Some(&definition(NodeKind::ImageGen)),
        );
        assert_eq!(inputs["prompt"], json!("a cat"));
        assert_eq!(inputs["model"], json!("nanobanana"));
    }

    #[test]
    fn test_edge_value_overrides_literal() {
        let source = GraphNode::new("in", NodeKind::TextInput);
        let target = GraphNode::new("gen", NodeKind::TextGen)
            .with_data(json!({"prompt": "stale literal"}));
        let graph = WorkflowGraph::new(
            vec![source, target.clone()],
            vec![GraphEdge::new("e1", "in", "text", "gen", "prompt")],
        );

        let mut context = RunContext::new();
        record(&mut context, "in", "text", json!("fresh upstream"));

        let inputs = resolve_inputs(&graph, &target, &context, Some(&definition(NodeKind::TextGen)));
        assert_eq!(inputs["prompt"], json!("fresh upstream"));
    }

    #[test]
    fn test_falls_back_to_source_property_bag() {
        // Producer never ran (skipped), so its literal is used
        let source = GraphNode::new("in", NodeKind::TextInput).with_data(json!({"text": "held"}));
        let target = GraphNode::new("gen", NodeKind::TextGen);
        let graph = WorkflowGraph::new(
            vec![source, target.clone()],
            vec![GraphEdge::new("e1", "in", "text", "gen", "prompt")],
        );

        let inputs = resolve_inputs(
            &graph,
            &target,
            &RunContext::new(),
            Some(&definition(NodeKind::TextGen)),
        );
        assert_eq!(inputs["prompt"], json!("held"));
    }

    #[test]
    fn test_two_text_edges_concatenate() {
        let a = GraphNode::new("a", NodeKind::TextInput);
        let b = GraphNode::new("b", NodeKind::TextInput);
        let target = GraphNode::new("gen", NodeKind::TextGen);
        let graph = WorkflowGraph::new(
            vec![a, b, target.clone()],
            vec![
                GraphEdge::new("e1", "a", "text", "gen", "prompt"),
                GraphEdge::new("e2", "b", "text", "gen", "prompt"),
            ],
        );

        let mut context = RunContext::new();
        record(&mut context, "a", "text", json!("a"));
        record(&mut context, "b", "text", json!("b"));

        let inputs = resolve_inputs(&graph, &target, &context, Some(&definition(NodeKind::TextGen)));
        assert_eq!(inputs["prompt"], json!("a\nb"));
    }

    #[test]
    fn test_two_image_edges_form_ordered_list() {
        let a = GraphNode::new("a", NodeKind::ImageInput);
        let b = GraphNode::new("b", NodeKind::ImageInput);
        let target = GraphNode::new("vid", NodeKind::VideoGen);
        let graph = WorkflowGraph::new(
            vec![a, b, target.clone()],
            vec![
                GraphEdge::new("e1", "a", "image", "vid", "image"),
                GraphEdge::new("e2", "b", "image", "vid", "image"),
            ],
        );

        let mut context = RunContext::new();
        record(&mut context, "a", "image", json!("https://x/1.png"));
        record(&mut context, "b", "image", json!("https://x/2.png"));

        let inputs = resolve_inputs(&graph, &target, &context, Some(&definition(NodeKind::VideoGen)));
        assert_eq!(inputs["image"], json!(["https://x/1.png", "https://x/2.png"]));
    }

    #[test]
    fn test_legacy_key_mirrors_typed_port() {
        let source = GraphNode::new("in", NodeKind::TextInput);
        let target = GraphNode::new("gen", NodeKind::TextGen);
        let graph = WorkflowGraph::new(
            vec![source, target.clone()],
            vec![GraphEdge::new("e1", "in", "text", "gen", "prompt")],
        );

        let mut context = RunContext::new();
        record(&mut context, "in", "text", json!("hello"));

        let inputs = resolve_inputs(&graph, &target, &context, Some(&definition(NodeKind::TextGen)));
        // "prompt" is a text port, so the legacy "text" key mirrors it
        assert_eq!(inputs["text"], json!("hello"));
    }

    #[test]
    fn test_unresolvable_edge_leaves_literal_alone() {
        let source = GraphNode::new("in", NodeKind::ImageInput);
        let target = GraphNode::new("gen", NodeKind::ImageGen)
            .with_data(json!({"prompt": "literal wins"}));
        let graph = WorkflowGraph::new(
            vec![source, target.clone()],
            vec![GraphEdge::new("e1", "in", "image", "gen", "prompt")],
        );

        // Producer holds nothing usable; the normalized null must not
        // clobber the literal
        let inputs = resolve_inputs(
            &graph,
            &target,
            &RunContext::new(),
            Some(&definition(NodeKind::ImageGen)),
        );
        assert_eq!(inputs["prompt"], json!("literal wins"));
    }

    #[test]
    fn test_extract_hint_by_type() {
        let data = json!({"prompt": "p", "image": "https://x/a.png", "video": "https://x/v.mp4"});
        assert_eq!(extract_hint(&data, PortDataType::Text), json!("p"));
        assert_eq!(extract_hint(&data, PortDataType::Image), json!("https://x/a.png"));
        assert_eq!(extract_hint(&data, PortDataType::Video), json!("https://x/v.mp4"));
        assert_eq!(extract_hint(&json!(null), PortDataType::Text), Value::Null);
    }
}
