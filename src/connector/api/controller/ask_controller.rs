use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::Turn;

use super::super::Container;

pub struct AskController<'a> {
    container: &'a Container,
}

impl<'a> AskController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn ask(&self, message: String, history: Option<PathBuf>) -> Result<String> {
        let history = match history {
            Some(path) => load_history(&path)?,
            None => Vec::new(),
        };

        let generator = self.container.reply_generator();
        Ok(generator
            .generate_reply_cancellable(&history, &message, self.container.cancel_token())
            .await)
    }
}

/// Read a JSON array of turns (`[{"role": "user", "text": "Hi"}, ...]`).
pub fn load_history(path: &Path) -> Result<Vec<Turn>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("History file {} is not a JSON array of turns", path.display()))
}
