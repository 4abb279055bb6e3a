//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Chat models (Gemini over HTTPS, plus an offline mock)
//! - The CLI host: container, router and controllers

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::{Container, ContainerConfig, Router};
