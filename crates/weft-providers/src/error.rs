//! Error types for provider adapters

use thiserror::Error;

/// Result type alias using ProviderError
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur while talking to a generation provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider configuration is missing or incomplete
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No provider family recognizes this model id
    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    /// The family does not support the requested operation
    #[error("Model '{model}' does not support {operation} generation")]
    Unsupported { model: String, operation: String },

    /// The request could not be built from the given inputs
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Provider returned a non-2xx response
    #[error("Provider error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure before a provider response was received
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Provider response did not have the expected shape
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// Async task reached the `failed` terminal state
    #[error("Generation task failed ({code}): {message}")]
    TaskFailed { code: String, message: String },

    /// Async task reached the `expired` terminal state
    #[error("Generation task expired")]
    TaskExpired,

    /// Polling attempt budget was exhausted before a terminal state
    #[error("Generation task timed out after {attempts} polls")]
    TaskTimeout { attempts: u32 },

    /// Generation was cancelled before completion
    #[error("Generation cancelled")]
    Cancelled,
}

impl ProviderError {
    /// Missing-config error naming the offending field
    pub fn missing(field: &str, family: &str) -> Self {
        Self::Configuration(format!("missing {} for provider '{}'", field, family))
    }
}
