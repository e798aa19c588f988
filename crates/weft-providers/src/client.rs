//! Shared HTTP plumbing for provider adapters
//!
//! Every adapter goes through these helpers so failure semantics stay
//! uniform: a transport failure maps to `Network`, a non-2xx response is
//! read for the provider's own error message and maps to `Api`.

use serde_json::Value;

use crate::error::{ProviderError, Result};

/// A named HTTP header
pub type Header = (&'static str, String);

/// Thin wrapper over a shared reqwest client
#[derive(Debug, Clone, Default)]
pub struct Http {
    client: reqwest::Client,
}

impl Http {
    pub fn new() -> Self {
        Self::default()
    }

    /// POST a JSON body and parse the JSON response
    pub async fn post_json(&self, url: &str, headers: &[Header], body: &Value) -> Result<Value> {
        let mut request = self.client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, value);
        }
        let response = request.send().await?;
        Self::read_json(response).await
    }

    /// GET and parse the JSON response
    pub async fn get_json(&self, url: &str, headers: &[Header]) -> Result<Value> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, value);
        }
        let response = request.send().await?;
        Self::read_json(response).await
    }

    async fn read_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| ProviderError::MalformedResponse(format!("invalid JSON: {}", e)))
    }
}

/// Pull a human-readable message out of a provider error body
///
/// Providers disagree on the shape (`error.message`, `error`, `message`);
/// fall back to the raw body so nothing is swallowed.
pub fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(message) = json
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return message.to_string();
        }
        if let Some(message) = json.get("error").and_then(|e| e.as_str()) {
            return message.to_string();
        }
        if let Some(message) = json.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }

    if body.trim().is_empty() {
        "unknown provider error".to_string()
    } else {
        body.trim().to_string()
    }
}

/// Standard bearer-token auth header
pub fn bearer(api_key: &str) -> Header {
    ("Authorization", format!("Bearer {}", api_key))
}
