use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::application::{ChatModel, ReplyGenerator};
use crate::connector::adapter::{GeminiClient, MockChatModel};
use crate::domain::PersonaConfig;

pub struct ContainerConfig {
    /// Use the offline [`MockChatModel`] instead of calling Gemini.
    pub mock_model: bool,
    /// Per-request deadline. `None` waits for the remote service indefinitely.
    pub timeout: Option<Duration>,
}

pub struct Container {
    chat_model: Arc<dyn ChatModel>,
    cancel_token: CancellationToken,
    config: ContainerConfig,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Result<Self> {
        let chat_model: Arc<dyn ChatModel> = if config.mock_model {
            debug!("Using mock chat model");
            Arc::new(MockChatModel::new())
        } else {
            let client = GeminiClient::from_env(Arc::new(PersonaConfig::spur()));
            debug!("Using Gemini model {} at {}", client.model_name(), client.url());
            Arc::new(client)
        };

        Ok(Self::with_model(chat_model, config))
    }

    /// Wire an explicit model handle, e.g. a [`GeminiClient`] pointed at a
    /// non-default endpoint.
    pub fn with_model(chat_model: Arc<dyn ChatModel>, config: ContainerConfig) -> Self {
        Self {
            chat_model,
            cancel_token: CancellationToken::new(),
            config,
        }
    }

    pub fn reply_generator(&self) -> ReplyGenerator {
        let generator = ReplyGenerator::new(self.chat_model.clone());
        match self.config.timeout {
            Some(timeout) => generator.with_timeout(timeout),
            None => generator,
        }
    }

    /// Process-wide token; cancelling it abandons any in-flight request.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    pub fn model_name(&self) -> &str {
        self.chat_model.model_name()
    }
}
