//! # Domain Layer
//!
//! Conversation turns, the persona configuration and the error taxonomy.
//! This layer is independent of external frameworks and infrastructure.

pub mod models;
pub mod services;

pub use models::*;
pub use services::*;
