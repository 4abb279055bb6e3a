use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote service returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Invalid history: {0}")]
    InvalidHistory(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Cancelled by caller")]
    Cancelled,
}

impl ReplyError {
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn remote(status: u16, msg: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: msg.into(),
        }
    }

    pub fn invalid_history(msg: impl Into<String>) -> Self {
        Self::InvalidHistory(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}
