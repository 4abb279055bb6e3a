pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{ChatModel, ReplyGenerator};

pub use cli::Commands;

pub use connector::{Container, ContainerConfig, GeminiClient, MockChatModel, Router};

pub use domain::{
    PersonaConfig, ReplyError, Role, Turn, FALLBACK_REPLY, SPUR_SYSTEM_PROMPT, SUPPORT_EMAIL,
};
