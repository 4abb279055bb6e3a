use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::error;

use crate::domain::{Turn, FALLBACK_REPLY};

use super::super::Container;

const PROMPT: &[u8] = b"> ";
const EXIT_COMMAND: &str = "/exit";

/// Interactive loop: one reply per input line, with the exchange kept in a
/// local history that lives only as long as the loop.
pub struct ChatController<'a> {
    container: &'a Container,
}

impl<'a> ChatController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Runs until EOF, `/exit`, or cancellation. Returns the number of
    /// completed exchanges.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let generator = self.container.reply_generator();
        let cancel = self.container.cancel_token();
        let mut history: Vec<Turn> = Vec::new();
        let mut lines = input.lines();

        output.write_all(PROMPT).await?;
        output.flush().await?;

        loop {
            let line = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                line = lines.next_line() => line?,
            };
            let Some(line) = line else {
                break;
            };

            let message = line.trim();
            if message == EXIT_COMMAND {
                break;
            }
            if !message.is_empty() {
                let outcome = generator
                    .try_generate_reply(&history, message, Some(cancel))
                    .await;
                let reply = match outcome {
                    Ok(reply) => {
                        history.push(Turn::user(message));
                        history.push(Turn::model(reply.as_str()));
                        reply
                    }
                    // A failed exchange is not context worth resending.
                    Err(e) => {
                        error!("Reply generation failed: {e}");
                        FALLBACK_REPLY.to_string()
                    }
                };
                output.write_all(reply.as_bytes()).await?;
                output.write_all(b"\n").await?;
            }

            if cancel.is_cancelled() {
                break;
            }
            output.write_all(PROMPT).await?;
            output.flush().await?;
        }

        output.flush().await?;
        Ok(history.len() / 2)
    }
}
