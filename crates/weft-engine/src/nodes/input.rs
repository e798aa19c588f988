//! Input nodes
//!
//! An input node holds a value placed on it by the canvas (typed text, an
//! uploaded image, a recorded clip) and emits it into the run. Execution is
//! just re-normalizing whatever the node holds; nothing external is called.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::normalize::normalize;
use crate::types::{GraphNode, NodeDefinition, NodeKind, PortDefinition};

use super::{with_default, NodeHandler, NodeInputs, NodeOutputs, NodeServices};

pub struct InputNode {
    definition: NodeDefinition,
}

impl InputNode {
    pub fn new(kind: NodeKind) -> Self {
        debug_assert!(kind.is_input());
        let data_type = kind.media_type();
        // Port id matches the type's conventional key: text, image, video, model
        let port = data_type.legacy_key().unwrap_or("value");
        let label = match kind {
            NodeKind::TextInput => "Text Input",
            NodeKind::ImageInput => "Image Input",
            NodeKind::VideoInput => "Video Input",
            _ => "3D Input",
        };
        Self {
            definition: NodeDefinition {
                kind,
                label: label.to_string(),
                inputs: vec![PortDefinition::optional(port, label, data_type)],
                outputs: vec![PortDefinition::optional(port, label, data_type)],
                required_fields: vec![],
            },
        }
    }

    fn port(&self) -> &PortDefinition {
        // Built with exactly one output port
        &self.definition.outputs[0]
    }
}

#[async_trait]
impl NodeHandler for InputNode {
    fn definition(&self) -> &NodeDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        _node: &GraphNode,
        inputs: &NodeInputs,
        _services: &NodeServices<'_>,
    ) -> Result<NodeOutputs> {
        let port = self.port();
        let held = inputs.get(&port.id).cloned().unwrap_or(Value::Null);
        let value = normalize(held, port.data_type);
        Ok(with_default(&port.id, value))
    }
}
