//! Abstract generation requests and canonical results
//!
//! The engine's node handlers translate node configuration and resolved
//! inputs into a `GenerationRequest`; adapters turn that into a concrete
//! wire call and hand back a canonical `Generated` value, independent of
//! the provider's response shape.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What kind of artifact the request should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Text,
    Image,
    Video,
    Model3d,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
            Self::Model3d => "3d",
        }
    }
}

/// Tuning parameters common across families
///
/// Adapters pick the fields their protocol understands and ignore the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationParams {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    /// Image size, e.g. "1024x1024"
    pub size: Option<String>,
    /// Video aspect ratio, e.g. "16:9"
    pub aspect_ratio: Option<String>,
    /// Video duration in seconds
    pub duration: Option<u32>,
    /// Video resolution, e.g. "720p"
    pub resolution: Option<String>,
}

/// A provider-agnostic generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub operation: Operation,
    /// Model id as named on the node; selects the provider family
    pub model: String,
    pub prompt: String,
    pub system: Option<String>,
    /// Source images as URLs or data URIs, in edge order
    pub images: Vec<String>,
    pub params: GenerationParams,
}

impl GenerationRequest {
    pub fn new(operation: Operation, model: impl Into<String>) -> Self {
        Self {
            operation,
            model: model.into(),
            prompt: String::new(),
            system: None,
            images: Vec::new(),
            params: GenerationParams::default(),
        }
    }
}

/// Canonical value produced by a generation call
#[derive(Debug, Clone, PartialEq)]
pub enum Generated {
    /// Plain text (chat completion)
    Text(String),
    /// One or more image refs (URL or data URI)
    Images(Vec<String>),
    /// Single video URL
    Video(String),
    /// Single 3D archive URL
    Model(String),
}

impl Generated {
    /// Flatten to a JSON port value
    pub fn into_value(self) -> serde_json::Value {
        match self {
            Self::Text(text) => serde_json::Value::String(text),
            Self::Images(images) => serde_json::json!(images),
            Self::Video(url) | Self::Model(url) => serde_json::Value::String(url),
        }
    }
}

/// Cooperative cancellation flag shared between the run loop and pollers
///
/// Cancellation never aborts an in-flight HTTP call; it only stops the next
/// iteration from starting.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The seam between the engine and the provider layer
///
/// The production implementation is `ProviderRouter`; tests inject fakes.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Execute one generation request to a canonical value
    async fn generate(&self, request: GenerationRequest, cancel: &CancelToken)
        -> Result<Generated>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_into_value() {
        assert_eq!(
            Generated::Text("hello".into()).into_value(),
            serde_json::json!("hello")
        );
        assert_eq!(
            Generated::Images(vec!["https://x/a.png".into()]).into_value(),
            serde_json::json!(["https://x/a.png"])
        );
        assert_eq!(
            Generated::Video("https://x/clip.mp4".into()).into_value(),
            serde_json::json!("https://x/clip.mp4")
        );
    }

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        let shared = token.clone();
        shared.cancel();
        assert!(token.is_cancelled());
    }
}
