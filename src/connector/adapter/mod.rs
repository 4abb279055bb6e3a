mod gemini_client;
mod mock_chat_model;

pub use gemini_client::*;
pub use mock_chat_model::*;
