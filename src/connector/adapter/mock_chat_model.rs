use async_trait::async_trait;

use crate::application::ChatModel;
use crate::domain::{ReplyError, Turn};

/// Offline stand-in for the remote model. Echoes the message along with the
/// number of prior turns it was given, so callers can see the history flow.
pub struct MockChatModel;

impl MockChatModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockChatModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn send_message(&self, history: &[Turn], message: &str) -> Result<String, ReplyError> {
        Ok(format!(
            "[mock reply after {} turns] {}",
            history.len(),
            message.trim()
        ))
    }

    fn model_name(&self) -> &str {
        "mock-chat"
    }
}
