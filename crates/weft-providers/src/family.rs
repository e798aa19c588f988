//! Provider family selection
//!
//! A family is a group of models sharing one wire protocol. The family is
//! chosen by pattern-matching the model id, mirroring how users name models
//! on the canvas ("gpt-4o", "claude-sonnet-4-5", "nanobanana", ...).

use crate::error::{ProviderError, Result};

/// Wire protocol families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderFamily {
    /// OpenAI-compatible chat/images API
    OpenAi,
    /// Anthropic messages API
    Anthropic,
    /// Google GenAI generateContent API
    Google,
    /// Ark batch API (sync images, async video/3D tasks)
    Ark,
    /// Local Ollama daemon
    Ollama,
}

impl ProviderFamily {
    /// Select the family for a model id
    ///
    /// Matching is case-insensitive substring matching; unknown ids are an
    /// error rather than a silent default.
    pub fn detect(model_id: &str) -> Result<Self> {
        let id = model_id.to_ascii_lowercase();

        if id == "ollama" || id.starts_with("ollama:") {
            Ok(Self::Ollama)
        } else if id.contains("claude") {
            Ok(Self::Anthropic)
        } else if id.contains("gpt") {
            Ok(Self::OpenAi)
        } else if id.contains("gemini") || id.contains("nanobanana") {
            Ok(Self::Google)
        } else if id.contains("seedream") || id.contains("seedance") || id.contains("doubao") {
            Ok(Self::Ark)
        } else {
            Err(ProviderError::UnsupportedModel(model_id.to_string()))
        }
    }

    /// Family identifier used in error messages and logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
            Self::Ark => "ark",
            Self::Ollama => "ollama",
        }
    }

    /// Whether this family needs a credential before any request
    ///
    /// Ollama is the only local, credential-free family.
    pub fn requires_credential(&self) -> bool {
        !matches!(self, Self::Ollama)
    }
}
