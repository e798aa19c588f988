//! Generation provider adapters for the Weft workflow engine
//!
//! This crate translates abstract generation requests (text, image, video,
//! 3D model) into the wire protocols of the concrete providers behind them:
//!
//! - OpenAI-compatible chat completions and image generations
//! - Anthropic messages
//! - Google GenAI `generateContent`
//! - the Ark batch protocol (video/3D generation via polled async tasks)
//! - a local Ollama daemon
//!
//! The provider family is selected by pattern-matching the model id, so the
//! engine only ever deals in `GenerationRequest` and the canonical
//! `Generated` value. Long-running video/3D jobs return a task handle that
//! the poller drives to a terminal state on a fixed interval.

pub mod backends;
pub mod client;
pub mod config;
pub mod error;
pub mod family;
pub mod poll;
pub mod request;
pub mod router;

pub use config::{ConfigStore, MemoryConfigStore, ProviderConfig};
pub use error::{ProviderError, Result};
pub use family::ProviderFamily;
pub use poll::{AsyncTask, PollBudget, TaskStatus, POLL_INTERVAL};
pub use request::{
    CancelToken, Generated, GenerationClient, GenerationParams, GenerationRequest, Operation,
};
pub use router::ProviderRouter;
