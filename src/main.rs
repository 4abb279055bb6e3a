use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::io::BufReader;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use spur_assistant::connector::api::ChatController;
use spur_assistant::{Commands, Container, ContainerConfig, Router};

#[derive(Parser)]
#[command(name = "spur-assistant")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Answer with an offline mock model instead of calling Gemini
    #[arg(long, global = true)]
    mock: bool,

    /// Abandon a request that takes longer than this many seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let container = Container::new(ContainerConfig {
        mock_model: cli.mock,
        timeout: cli.timeout_secs.map(Duration::from_secs),
    })?;

    let cancel = container.cancel_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted; cancelling in-flight request");
            cancel.cancel();
        }
    });

    match cli.command {
        Commands::Chat => {
            info!("Chatting with {} (type /exit to quit)", container.model_name());
            let stdin = BufReader::new(tokio::io::stdin());
            ChatController::new(&container)
                .run(stdin, tokio::io::stdout())
                .await?;
        }
        command => {
            let router = Router::new(&container);
            let output = router.route(command).await?;
            println!("{output}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn ask_accepts_history_and_global_flags() {
        let cli = Cli::try_parse_from([
            "spur-assistant",
            "ask",
            "Pricing?",
            "--history",
            "turns.json",
            "--mock",
            "--timeout-secs",
            "5",
        ])
        .unwrap();

        assert!(cli.mock);
        assert_eq!(cli.timeout_secs, Some(5));
        match cli.command {
            Commands::Ask { message, history } => {
                assert_eq!(message, "Pricing?");
                assert_eq!(history.unwrap().to_str(), Some("turns.json"));
            }
            Commands::Chat => panic!("expected ask"),
        }
    }

    #[test]
    fn ask_requires_a_message() {
        assert!(Cli::try_parse_from(["spur-assistant", "ask"]).is_err());
    }
}
