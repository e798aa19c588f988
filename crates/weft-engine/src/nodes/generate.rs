//! Generator nodes
//!
//! The four generator kinds share one handler: assemble a
//! `GenerationRequest` from the node's configuration and resolved inputs,
//! hand it to the provider seam, and map the canonical result back onto
//! output ports. Which provider actually serves the request is decided by
//! the router from the model id.

use async_trait::async_trait;
use log::debug;
use serde_json::{json, Value};

use weft_providers::{Generated, GenerationParams, GenerationRequest, Operation};

use crate::error::{EngineError, Result};
use crate::normalize::media_refs;
use crate::types::{GraphNode, NodeDefinition, NodeKind, PortDataType, PortDefinition};

use super::{with_default, InputsExt, NodeHandler, NodeInputs, NodeOutputs, NodeServices};

pub struct GenerateNode {
    definition: NodeDefinition,
    operation: Operation,
}

impl GenerateNode {
    pub fn new(kind: NodeKind) -> Self {
        debug_assert!(kind.is_generator());
        let (operation, definition) = match kind {
            NodeKind::TextGen => (
                Operation::Text,
                NodeDefinition {
                    kind,
                    label: "Text Generation".to_string(),
                    inputs: vec![
                        PortDefinition::required("prompt", "Prompt", PortDataType::Text),
                        PortDefinition::optional("image", "Image", PortDataType::Image),
                    ],
                    outputs: vec![PortDefinition::optional("text", "Text", PortDataType::Text)],
                    required_fields: vec!["prompt".to_string(), "model".to_string()],
                },
            ),
            NodeKind::ImageGen => (
                Operation::Image,
                NodeDefinition {
                    kind,
                    label: "Image Generation".to_string(),
                    inputs: vec![
                        PortDefinition::required("prompt", "Prompt", PortDataType::Text),
                        PortDefinition::optional("image", "Reference Images", PortDataType::Image),
                    ],
                    outputs: vec![PortDefinition::optional("images", "Images", PortDataType::Image)],
                    required_fields: vec!["prompt".to_string(), "model".to_string()],
                },
            ),
            NodeKind::VideoGen => (
                Operation::Video,
                NodeDefinition {
                    kind,
                    label: "Video Generation".to_string(),
                    inputs: vec![
                        PortDefinition::required("prompt", "Prompt", PortDataType::Text),
                        PortDefinition::optional("image", "Frames", PortDataType::Image),
                    ],
                    outputs: vec![PortDefinition::optional("video", "Video", PortDataType::Video)],
                    required_fields: vec!["prompt".to_string(), "model".to_string()],
                },
            ),
            _ => (
                Operation::Model3d,
                NodeDefinition {
                    kind: NodeKind::ModelGen,
                    label: "3D Generation".to_string(),
                    inputs: vec![
                        PortDefinition::required("image", "Source Image", PortDataType::Image),
                        PortDefinition::optional("prompt", "Prompt", PortDataType::Text),
                    ],
                    outputs: vec![PortDefinition::optional("model", "Model", PortDataType::Model3d)],
                    required_fields: vec!["image".to_string(), "model".to_string()],
                },
            ),
        };
        Self {
            definition,
            operation,
        }
    }

    fn build_request(&self, inputs: &NodeInputs) -> Result<GenerationRequest> {
        let model = inputs.get_string("model")?;
        let mut request = GenerationRequest::new(self.operation, model);

        request.prompt = inputs.get_string_opt("prompt").unwrap_or_default().to_string();
        if request.prompt.is_empty() && self.operation != Operation::Model3d {
            return Err(EngineError::MissingInput("prompt".to_string()));
        }

        let image_value = inputs.get("image").or_else(|| inputs.get("images"));
        request.images = image_value.map(media_refs).unwrap_or_default();
        if request.images.is_empty() && self.operation == Operation::Model3d {
            return Err(EngineError::MissingInput("image".to_string()));
        }

        request.system = inputs.get_string_opt("system").map(str::to_string);
        request.params = GenerationParams {
            temperature: inputs.get_f64_opt("temperature"),
            max_tokens: inputs.get_u32_opt("max_tokens"),
            size: inputs.get_string_opt("size").map(str::to_string),
            aspect_ratio: inputs.get_string_opt("aspect_ratio").map(str::to_string),
            duration: inputs.get_u32_opt("duration"),
            resolution: inputs.get_string_opt("resolution").map(str::to_string),
        };
        Ok(request)
    }
}

#[async_trait]
impl NodeHandler for GenerateNode {
    fn definition(&self) -> &NodeDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        node: &GraphNode,
        inputs: &NodeInputs,
        services: &NodeServices<'_>,
    ) -> Result<NodeOutputs> {
        let request = self.build_request(inputs)?;
        debug!(
            "node {}: {} generation with model {} ({} source images)",
            node.id,
            request.operation.name(),
            request.model,
            request.images.len()
        );

        let generated = services.client.generate(request, services.cancel).await?;
        Ok(match generated {
            Generated::Text(text) => with_default("text", Value::String(text)),
            Generated::Images(images) => {
                let first = images.first().cloned().map(Value::String);
                let mut outputs = with_default("images", json!(images));
                if let Some(first) = first {
                    outputs.insert("image".to_string(), first);
                }
                outputs
            }
            Generated::Video(url) => with_default("video", Value::String(url)),
            Generated::Model(url) => with_default("model", Value::String(url)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::tests_support::FakeClient;
    use weft_providers::CancelToken;
    use serde_json::json;

    fn run_inputs(pairs: &[(&str, Value)]) -> NodeInputs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_text_gen_builds_request_and_maps_output() {
        let handler = GenerateNode::new(NodeKind::TextGen);
        let node = GraphNode::new("gen", NodeKind::TextGen);
        let inputs = run_inputs(&[
            ("model", json!("gpt-4o")),
            ("prompt", json!("write a haiku")),
            ("temperature", json!(0.3)),
        ]);

        let client = FakeClient::text("line one");
        let cancel = CancelToken::new();
        let outputs = handler
            .execute(&node, &inputs, &NodeServices { client: &client, cancel: &cancel })
            .await
            .unwrap();

        assert_eq!(outputs["text"], json!("line one"));
        assert_eq!(outputs["default"], json!("line one"));

        let request = client.last_request().unwrap();
        assert_eq!(request.operation, Operation::Text);
        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.prompt, "write a haiku");
        assert_eq!(request.params.temperature, Some(0.3));
    }

    #[tokio::test]
    async fn test_image_gen_exposes_list_and_first_image() {
        let handler = GenerateNode::new(NodeKind::ImageGen);
        let node = GraphNode::new("gen", NodeKind::ImageGen);
        let inputs = run_inputs(&[("model", json!("nanobanana")), ("prompt", json!("a cat"))]);

        let client = FakeClient::replying(|_| {
            Ok(Generated::Images(vec![
                "https://x/a.png".into(),
                "https://x/b.png".into(),
            ]))
        });
        let cancel = CancelToken::new();
        let outputs = handler
            .execute(&node, &inputs, &NodeServices { client: &client, cancel: &cancel })
            .await
            .unwrap();

        assert_eq!(outputs["images"], json!(["https://x/a.png", "https://x/b.png"]));
        assert_eq!(outputs["image"], json!("https://x/a.png"));
        assert_eq!(outputs["default"], json!(["https://x/a.png", "https://x/b.png"]));
    }

    #[tokio::test]
    async fn test_video_gen_forwards_frames_and_params() {
        let handler = GenerateNode::new(NodeKind::VideoGen);
        let node = GraphNode::new("gen", NodeKind::VideoGen);
        let inputs = run_inputs(&[
            ("model", json!("seedance-pro")),
            ("prompt", json!("slow pan")),
            ("image", json!(["https://x/first.png", "https://x/last.png"])),
            ("aspect_ratio", json!("16:9")),
            ("duration", json!(5)),
        ]);

        let client = FakeClient::replying(|_| Ok(Generated::Video("https://x/clip.mp4".into())));
        let cancel = CancelToken::new();
        let outputs = handler
            .execute(&node, &inputs, &NodeServices { client: &client, cancel: &cancel })
            .await
            .unwrap();

        assert_eq!(outputs["video"], json!("https://x/clip.mp4"));
        let request = client.last_request().unwrap();
        assert_eq!(request.images, vec!["https://x/first.png", "https://x/last.png"]);
        assert_eq!(request.params.aspect_ratio.as_deref(), Some("16:9"));
        assert_eq!(request.params.duration, Some(5));
    }

    #[tokio::test]
    async fn test_model_gen_requires_source_image() {
        let handler = GenerateNode::new(NodeKind::ModelGen);
        let node = GraphNode::new("gen", NodeKind::ModelGen);
        let inputs = run_inputs(&[("model", json!("doubao-3d"))]);

        let client = FakeClient::text("unused");
        let cancel = CancelToken::new();
        let err = handler
            .execute(&node, &inputs, &NodeServices { client: &client, cancel: &cancel })
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::MissingInput(field) if field == "image"));
        assert_eq!(client.request_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_prompt_fails_before_any_call() {
        let handler = GenerateNode::new(NodeKind::TextGen);
        let node = GraphNode::new("gen", NodeKind::TextGen);
        let inputs = run_inputs(&[("model", json!("gpt-4o")), ("prompt", json!("   "))]);

        let client = FakeClient::text("unused");
        let cancel = CancelToken::new();
        let err = handler
            .execute(&node, &inputs, &NodeServices { client: &client, cancel: &cancel })
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::MissingInput(field) if field == "prompt"));
        assert_eq!(client.request_count(), 0);
    }
}
