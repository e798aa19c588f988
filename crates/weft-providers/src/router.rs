//! Request routing across provider families
//!
//! `ProviderRouter` is the production `GenerationClient`: detect the family
//! from the model id, fetch and pre-flight the config, dispatch to the wire
//! adapter, and for Ark video/3D hand the task id to the poller.

use std::sync::Arc;

use async_trait::async_trait;

use crate::backends::{anthropic, ark, google, ollama, openai};
use crate::client::Http;
use crate::config::{ConfigStore, ProviderConfig};
use crate::error::{ProviderError, Result};
use crate::family::ProviderFamily;
use crate::poll::{self, PollBudget};
use crate::request::{CancelToken, Generated, GenerationClient, GenerationRequest, Operation};

/// Routes generation requests to the matching provider adapter
pub struct ProviderRouter {
    store: Arc<dyn ConfigStore>,
    http: Http,
}

impl ProviderRouter {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            store,
            http: Http::new(),
        }
    }

    fn config(&self, model_id: &str, family: ProviderFamily) -> Result<ProviderConfig> {
        let config = match self.store.config_for(model_id) {
            Some(config) => config,
            // The local daemon works out of the box without a settings entry
            None if family == ProviderFamily::Ollama => ProviderConfig {
                base_url: ollama::DEFAULT_BASE_URL.to_string(),
                api_key: None,
                model: None,
            },
            None => {
                return Err(ProviderError::Configuration(format!(
                    "no provider configured for model '{}'",
                    model_id
                )))
            }
        };
        config.checked(family)
    }
}

#[async_trait]
impl GenerationClient for ProviderRouter {
    async fn generate(&self, request: GenerationRequest, cancel: &CancelToken) -> Result<Generated> {
        let family = ProviderFamily::detect(&request.model)?;
        let config = self.config(&request.model, family)?;
        log::debug!(
            "dispatching {} generation for '{}' to {}",
            request.operation.name(),
            request.model,
            family.name()
        );

        match (family, request.operation) {
            (ProviderFamily::OpenAi, Operation::Text) => {
                openai::chat(&self.http, &config, &request).await
            }
            (ProviderFamily::OpenAi, Operation::Image) => {
                openai::image(&self.http, &config, &request).await
            }
            (ProviderFamily::Anthropic, Operation::Text) => {
                anthropic::chat(&self.http, &config, &request).await
            }
            (ProviderFamily::Google, Operation::Text | Operation::Image) => {
                google::generate(&self.http, &config, &request).await
            }
            (ProviderFamily::Ark, Operation::Image) => {
                ark::image(&self.http, &config, &request).await
            }
            (ProviderFamily::Ark, Operation::Video) => {
                let task_id = ark::submit_video(&self.http, &config, &request).await?;
                let url =
                    poll::wait_for_task(&self.http, &config, &task_id, PollBudget::VIDEO, cancel)
                        .await?;
                Ok(Generated::Video(url))
            }
            (ProviderFamily::Ark, Operation::Model3d) => {
                let task_id = ark::submit_model3d(&self.http, &config, &request).await?;
                let url =
                    poll::wait_for_task(&self.http, &config, &task_id, PollBudget::MODEL3D, cancel)
                        .await?;
                Ok(Generated::Model(url))
            }
            (ProviderFamily::Ollama, Operation::Text) => {
                ollama::chat(&self.http, &config, &request).await
            }
            (_, operation) => Err(ProviderError::Unsupported {
                model: request.model.clone(),
                operation: operation.name().to_string(),
            }),
        }
    }
}
