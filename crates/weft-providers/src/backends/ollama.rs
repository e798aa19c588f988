//! Local Ollama adapter
//!
//! `POST {base}/api/chat` against the local daemon, no auth header. Vision
//! models take base64 payloads in `messages[].images`. The model id on the
//! node is just "ollama" (or "ollama:<model>"); the concrete model comes
//! from the config override or the id suffix.

use serde_json::{json, Value};

use crate::backends::split_data_uri;
use crate::client::Http;
use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::request::{Generated, GenerationRequest};

/// Default daemon address when the host has no Ollama entry
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

/// Resolve the concrete Ollama model name
pub fn model_name<'a>(config: &'a ProviderConfig, request: &'a GenerationRequest) -> Result<&'a str> {
    if let Some(model) = config.model.as_deref().filter(|m| !m.is_empty()) {
        return Ok(model);
    }
    if let Some(suffix) = request.model.strip_prefix("ollama:").filter(|s| !s.is_empty()) {
        return Ok(suffix);
    }
    Err(ProviderError::Configuration(
        "no Ollama model configured; set one in provider settings or use 'ollama:<model>'"
            .to_string(),
    ))
}

/// Build the chat body
pub fn chat_body(model: &str, request: &GenerationRequest) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = &request.system {
        messages.push(json!({ "role": "system", "content": system }));
    }

    let mut user = json!({ "role": "user", "content": request.prompt });
    let images: Vec<&str> = request
        .images
        .iter()
        .filter_map(|i| split_data_uri(i).map(|(_, data)| data))
        .collect();
    if !images.is_empty() {
        user["images"] = json!(images);
    }
    messages.push(user);

    let mut body = json!({
        "model": model,
        "messages": messages,
        "stream": false,
    });
    if let Some(temperature) = request.params.temperature {
        body["options"] = json!({ "temperature": temperature });
    }
    body
}

/// Parse `message.content`
pub fn parse_chat(response: &Value) -> Result<Generated> {
    let content = response
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| ProviderError::MalformedResponse("no message.content".to_string()))?;
    Ok(Generated::Text(content.to_string()))
}

/// Text generation via the local daemon
pub async fn chat(http: &Http, config: &ProviderConfig, request: &GenerationRequest) -> Result<Generated> {
    let model = model_name(config, request)?;
    let url = format!("{}/api/chat", config.base());
    let response = http.post_json(&url, &[], &chat_body(model, request)).await?;
    parse_chat(&response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Operation;

    #[test]
    fn test_model_name_from_config() {
        let config = ProviderConfig {
            model: Some("llama3".into()),
            ..Default::default()
        };
        let request = GenerationRequest::new(Operation::Text, "ollama");
        assert_eq!(model_name(&config, &request).unwrap(), "llama3");
    }

    #[test]
    fn test_model_name_from_id_suffix() {
        let config = ProviderConfig::default();
        let request = GenerationRequest::new(Operation::Text, "ollama:mistral");
        assert_eq!(model_name(&config, &request).unwrap(), "mistral");
    }

    #[test]
    fn test_model_name_missing() {
        let config = ProviderConfig::default();
        let request = GenerationRequest::new(Operation::Text, "ollama");
        assert!(matches!(
            model_name(&config, &request),
            Err(ProviderError::Configuration(_))
        ));
    }

    #[test]
    fn test_chat_body() {
        let mut request = GenerationRequest::new(Operation::Text, "ollama");
        request.prompt = "hello".into();
        request.params.temperature = Some(0.5);

        let body = chat_body("llama3", &request);
        assert_eq!(body["model"], "llama3");
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["options"]["temperature"], 0.5);
    }

    #[test]
    fn test_chat_body_strips_data_uri_for_images() {
        let mut request = GenerationRequest::new(Operation::Text, "ollama");
        request.prompt = "describe".into();
        request.images = vec![
            "data:image/png;base64,abc123".into(),
            "https://x/skipped.png".into(),
        ];

        let body = chat_body("llava:13b", &request);
        assert_eq!(body["messages"][0]["images"], json!(["abc123"]));
    }

    #[test]
    fn test_parse_chat() {
        let response = serde_json::json!({ "message": { "role": "assistant", "content": "hi" } });
        assert_eq!(parse_chat(&response).unwrap(), Generated::Text("hi".into()));
    }
}
