//! Provider configuration
//!
//! Configuration is supplied by the host application (settings UI, config
//! file) through the `ConfigStore` trait; this crate only reads it. A
//! missing or incomplete config is rejected before any request is sent.

use std::collections::HashMap;

use crate::error::{ProviderError, Result};
use crate::family::ProviderFamily;

/// Connection details for one provider/model
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    /// Base URL of the provider API (host root, or full prefix for Ark)
    pub base_url: String,
    /// API credential; not required for local providers
    pub api_key: Option<String>,
    /// Explicit model name override (e.g. the Ollama model to load)
    pub model: Option<String>,
}

impl ProviderConfig {
    /// Validate this config for the given family
    ///
    /// Fails with a message naming the missing field so the node error is
    /// actionable from the UI.
    pub fn checked(self, family: ProviderFamily) -> Result<Self> {
        if self.base_url.trim().is_empty() {
            return Err(ProviderError::missing("base URL", family.name()));
        }
        if family.requires_credential()
            && self.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            return Err(ProviderError::missing("API key", family.name()));
        }
        Ok(self)
    }

    /// Base URL without a trailing slash
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Effective model name: explicit override, else the request's id
    pub fn model_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.model.as_deref().filter(|m| !m.is_empty()).unwrap_or(fallback)
    }
}

/// Lookup of provider configs by model id
///
/// Implemented by the host; the router treats a `None` as "not configured"
/// for remote families and falls back to the local default for Ollama.
pub trait ConfigStore: Send + Sync {
    /// Get the config for a model id, if the host has one
    fn config_for(&self, model_id: &str) -> Option<ProviderConfig>;
}

/// In-memory config store keyed by model id
///
/// Used in tests and by embedders that load settings up front.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    configs: HashMap<String, ProviderConfig>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a config for a model id
    pub fn insert(&mut self, model_id: impl Into<String>, config: ProviderConfig) {
        self.configs.insert(model_id.into(), config);
    }
}

impl ConfigStore for MemoryConfigStore {
    fn config_for(&self, model_id: &str) -> Option<ProviderConfig> {
        self.configs.get(model_id).cloned()
    }
}
