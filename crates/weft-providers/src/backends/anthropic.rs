//! Anthropic messages adapter
//!
//! `POST {base}/v1/messages` with `x-api-key` and `anthropic-version`
//! headers. Data-URI images are sent as base64 source parts, remote URLs
//! as url source parts.

use serde_json::{json, Value};

use crate::backends::split_data_uri;
use crate::client::{Header, Http};
use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::request::{Generated, GenerationRequest};

const VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

fn headers(config: &ProviderConfig) -> Vec<Header> {
    vec![
        ("x-api-key", config.api_key.clone().unwrap_or_default()),
        ("anthropic-version", VERSION.to_string()),
    ]
}

fn image_part(image: &str) -> Value {
    match split_data_uri(image) {
        Some((mime, data)) => json!({
            "type": "image",
            "source": { "type": "base64", "media_type": mime, "data": data }
        }),
        None => json!({
            "type": "image",
            "source": { "type": "url", "url": image }
        }),
    }
}

/// Build the messages body
pub fn chat_body(config: &ProviderConfig, request: &GenerationRequest) -> Value {
    let mut content = Vec::new();
    for image in &request.images {
        content.push(image_part(image));
    }
    content.push(json!({ "type": "text", "text": request.prompt }));

    let mut body = json!({
        "model": config.model_or(&request.model),
        "max_tokens": request.params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        "messages": [{ "role": "user", "content": content }],
    });
    if let Some(system) = &request.system {
        body["system"] = json!(system);
    }
    if let Some(temperature) = request.params.temperature {
        body["temperature"] = json!(temperature);
    }
    body
}

/// Parse the text blocks of `content[]`
pub fn parse_chat(response: &Value) -> Result<Generated> {
    let blocks = response
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| ProviderError::MalformedResponse("no content array".to_string()))?;

    let text: Vec<&str> = blocks
        .iter()
        .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
        .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.is_empty() {
        return Err(ProviderError::MalformedResponse(
            "no text block in content".to_string(),
        ));
    }
    Ok(Generated::Text(text.join("")))
}

/// Text generation via the messages API
pub async fn chat(http: &Http, config: &ProviderConfig, request: &GenerationRequest) -> Result<Generated> {
    let url = format!("{}/v1/messages", config.base());
    let response = http.post_json(&url, &headers(config), &chat_body(config, request)).await?;
    parse_chat(&response)
}
