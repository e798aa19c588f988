//! Google GenAI adapter
//!
//! `POST {base}/v1beta/models/{model}:generateContent?key=KEY` with
//! `contents[].parts[]`; inline images travel as `inlineData`, remote URLs
//! as `fileData`. Image models (nanobanana) answer through the same
//! endpoint with `inlineData` parts in the candidate.

use serde_json::{json, Value};

use crate::backends::{split_data_uri, to_data_uri};
use crate::client::Http;
use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::request::{Generated, GenerationRequest, Operation};

fn image_part(image: &str) -> Value {
    match split_data_uri(image) {
        Some((mime, data)) => json!({ "inlineData": { "mimeType": mime, "data": data } }),
        None => json!({ "fileData": { "fileUri": image } }),
    }
}

/// Build the generateContent body
pub fn generate_body(request: &GenerationRequest) -> Value {
    let mut parts = vec![json!({ "text": request.prompt })];
    for image in &request.images {
        parts.push(image_part(image));
    }

    let mut generation_config = json!({});
    if let Some(temperature) = request.params.temperature {
        generation_config["temperature"] = json!(temperature);
    }
    if let Some(max_tokens) = request.params.max_tokens {
        generation_config["maxOutputTokens"] = json!(max_tokens);
    }
    if request.operation == Operation::Image {
        generation_config["responseModalities"] = json!(["TEXT", "IMAGE"]);
    }

    let mut body = json!({ "contents": [{ "parts": parts }] });
    if let Some(config) = generation_config.as_object() {
        if !config.is_empty() {
            body["generationConfig"] = generation_config.clone();
        }
    }
    if let Some(system) = &request.system {
        body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }
    body
}

/// Parse `candidates[0].content.parts[]` into the canonical value
///
/// Text operations join the text parts; image operations collect every
/// `inlineData` part as a data URI.
pub fn parse_generate(response: &Value, operation: Operation) -> Result<Generated> {
    let parts = response
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            ProviderError::MalformedResponse("no candidates[0].content.parts".to_string())
        })?;

    if operation == Operation::Image {
        let images: Vec<String> = parts
            .iter()
            .filter_map(|p| p.get("inlineData"))
            .filter_map(|d| {
                let mime = d.get("mimeType").and_then(|m| m.as_str())?;
                let data = d.get("data").and_then(|b| b.as_str())?;
                Some(to_data_uri(mime, data))
            })
            .collect();

        if images.is_empty() {
            return Err(ProviderError::MalformedResponse(
                "no inlineData image in candidate".to_string(),
            ));
        }
        return Ok(Generated::Images(images));
    }

    let text: Vec<&str> = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    if text.is_empty() {
        return Err(ProviderError::MalformedResponse(
            "no text part in candidate".to_string(),
        ));
    }
    Ok(Generated::Text(text.join("")))
}

/// Text or image generation via generateContent
pub async fn generate(
    http: &Http,
    config: &ProviderConfig,
    request: &GenerationRequest,
) -> Result<Generated> {
    let url = format!(
        "{}/v1beta/models/{}:generateContent?key={}",
        config.base(),
        config.model_or(&request.model),
        config.api_key.as_deref().unwrap_or_default(),
    );
    let response = http.post_json(&url, &[], &generate_body(request)).await?;
    parse_generate(&response, request.operation)
}
