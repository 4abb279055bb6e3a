use async_trait::async_trait;

use crate::domain::{ReplyError, Turn};

/// A handle to a remote conversational model with its persona already bound.
///
/// Each call is an independent session seeded with `history`; implementors
/// must not keep per-conversation state between calls, so a single handle
/// can serve concurrent callers.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send `message` as the newest user turn after `history` (oldest first)
    /// and return the model's reply text.
    async fn send_message(&self, history: &[Turn], message: &str) -> Result<String, ReplyError>;

    fn model_name(&self) -> &str;
}
