//! OpenAI-compatible adapter
//!
//! Text goes through `/v1/chat/completions` with optional vision
//! `image_url` parts; images go through `/v1/images/generations`.
//! Auth is a bearer token.

use serde_json::{json, Value};

use crate::backends::to_data_uri;
use crate::client::{bearer, Header, Http};
use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::request::{Generated, GenerationRequest};

fn headers(config: &ProviderConfig) -> Vec<Header> {
    match config.api_key.as_deref() {
        Some(key) => vec![bearer(key)],
        None => Vec::new(),
    }
}

/// Build the chat completion body
pub fn chat_body(config: &ProviderConfig, request: &GenerationRequest) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = &request.system {
        messages.push(json!({ "role": "system", "content": system }));
    }

    let content = if request.images.is_empty() {
        json!(request.prompt)
    } else {
        let mut parts = vec![json!({ "type": "text", "text": request.prompt })];
        for image in &request.images {
            parts.push(json!({ "type": "image_url", "image_url": { "url": image } }));
        }
        json!(parts)
    };
    messages.push(json!({ "role": "user", "content": content }));

    let mut body = json!({
        "model": config.model_or(&request.model),
        "messages": messages,
    });
    if let Some(temperature) = request.params.temperature {
        body["temperature"] = json!(temperature);
    }
    if let Some(max_tokens) = request.params.max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }
    body
}

/// Parse `choices[0].message.content`
pub fn parse_chat(response: &Value) -> Result<Generated> {
    let content = response
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| {
            ProviderError::MalformedResponse("no choices[0].message.content".to_string())
        })?;
    Ok(Generated::Text(content.to_string()))
}

/// Build the image generation body
pub fn image_body(config: &ProviderConfig, request: &GenerationRequest) -> Value {
    let mut body = json!({
        "model": config.model_or(&request.model),
        "prompt": request.prompt,
        "n": 1,
    });
    if let Some(size) = &request.params.size {
        body["size"] = json!(size);
    }
    body
}

/// Parse `data[].url` / `data[].b64_json` into image refs
pub fn parse_images(response: &Value) -> Result<Generated> {
    let data = response
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| ProviderError::MalformedResponse("no data array".to_string()))?;

    let mut images = Vec::new();
    for item in data {
        if let Some(url) = item.get("url").and_then(|u| u.as_str()) {
            images.push(url.to_string());
        } else if let Some(b64) = item.get("b64_json").and_then(|b| b.as_str()) {
            images.push(to_data_uri("image/png", b64));
        }
    }

    if images.is_empty() {
        return Err(ProviderError::MalformedResponse(
            "no image url or b64_json in data".to_string(),
        ));
    }
    Ok(Generated::Images(images))
}

/// Text generation via chat completions
pub async fn chat(http: &Http, config: &ProviderConfig, request: &GenerationRequest) -> Result<Generated> {
    let url = format!("{}/v1/chat/completions", config.base());
    let response = http.post_json(&url, &headers(config), &chat_body(config, request)).await?;
    parse_chat(&response)
}

/// Image generation
pub async fn image(http: &Http, config: &ProviderConfig, request: &GenerationRequest) -> Result<Generated> {
    let url = format!("{}/v1/images/generations", config.base());
    let response = http.post_json(&url, &headers(config), &image_body(config, request)).await?;
    parse_images(&response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Operation;

    fn config() -> ProviderConfig {
        ProviderConfig {
            base_url: "https://api.openai.com".into(),
            api_key: Some("sk-test".into()),
            model: None,
        }
    }

    #[test]
    fn test_chat_body_plain_text() {
        let mut request = GenerationRequest::new(Operation::Text, "gpt-4o");
        request.prompt = "hello".into();
        request.params.temperature = Some(0.7);

        let body = chat_body(&config(), &request);
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["temperature"], 0.7);
    }

    #[test]
    fn test_chat_body_vision_parts() {
        let mut request = GenerationRequest::new(Operation::Text, "gpt-4o");
        request.prompt = "describe this".into();
        request.system = Some("be brief".into());
        request.images = vec!["https://x/a.png".into()];

        let body = chat_body(&config(), &request);
        assert_eq!(body["messages"][0]["role"], "system");
        let content = &body["messages"][1]["content"];
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "https://x/a.png");
    }

    #[test]
    fn test_parse_chat() {
        let response = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "hi there" } }]
        });
        assert_eq!(
            parse_chat(&response).unwrap(),
            Generated::Text("hi there".into())
        );
    }

    #[test]
    fn test_parse_chat_missing_content() {
        let response = serde_json::json!({ "choices": [] });
        assert!(matches!(
            parse_chat(&response),
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_images_url_and_b64() {
        let response = serde_json::json!({
            "data": [
                { "url": "https://x/out.png" },
                { "b64_json": "aGVsbG8=" }
            ]
        });
        let Generated::Images(images) = parse_images(&response).unwrap() else {
            panic!("expected images");
        };
        assert_eq!(images[0], "https://x/out.png");
        assert_eq!(images[1], "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_image_body_size() {
        let mut request = GenerationRequest::new(Operation::Image, "gpt-image-1");
        request.prompt = "a cat".into();
        request.params.size = Some("1024x1024".into());

        let body = image_body(&config(), &request);
        assert_eq!(body["prompt"], "a cat");
        assert_eq!(body["size"], "1024x1024");
        assert_eq!(body["n"], 1);
    }
}
