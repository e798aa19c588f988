//! Preview nodes
//!
//! A preview node surfaces an upstream value on the canvas. Execution just
//! re-emits its resolved input so downstream edges (and the run results)
//! see the value under the preview's own id.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::normalize::normalize;
use crate::types::{GraphNode, NodeDefinition, NodeKind, PortDefinition};

use super::{with_default, NodeHandler, NodeInputs, NodeOutputs, NodeServices};

pub struct PreviewNode {
    definition: NodeDefinition,
}

impl PreviewNode {
    pub fn new(kind: NodeKind) -> Self {
        debug_assert!(kind.is_preview());
        let data_type = kind.media_type();
        let port = data_type.legacy_key().unwrap_or("value");
        let label = match kind {
            NodeKind::TextPreview => "Text Preview",
            NodeKind::ImagePreview => "Image Preview",
            NodeKind::VideoPreview => "Video Preview",
            _ => "3D Preview",
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
}

#[async_trait]
impl NodeHandler for PreviewNode {
    fn definition(&self) -> &NodeDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        _node: &GraphNode,
        inputs: &NodeInputs,
        _services: &NodeServices<'_>,
    ) -> Result<NodeOutputs> {
        let port = &self.definition.inputs[0];
        let incoming = inputs.get(&port.id).cloned().unwrap_or(Value::Null);
        let value = normalize(incoming, port.data_type);
        Ok(with_default(&port.id, value))
    }
}
