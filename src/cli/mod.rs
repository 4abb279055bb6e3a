use std::path::PathBuf;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Generate one reply to MESSAGE
    Ask {
        message: String,

        /// JSON file holding prior turns: [{"role": "user", "text": "..."}, ...]
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Start an interactive conversation on stdin/stdout (type /exit to quit)
    Chat,
}
