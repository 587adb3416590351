use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod chat;
pub mod status;

use crate::chat::Mode;
use crate::core::AppConfig;

#[derive(Subcommand)]
enum Command {
    /// Start an interactive study chat (default)
    Chat {},
    /// Print the backend status and exit
    Status {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Base URL of the SKY Dost backend
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Conversation mode to start in
    #[arg(long, value_enum, global = true)]
    mode: Option<Mode>,

    /// Seconds to wait for a chat response
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Don't show the welcome message
    #[arg(long, action, global = true, default_value = "false")]
    no_welcome: bool,

    /// Shell command that records speech and prints the transcript
    #[arg(long, global = true)]
    voice_command: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    /// Flags take precedence over the environment.
    fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(url) = &self.api_url {
            config.api_base_url = url.clone();
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(secs) = self.timeout {
            config.request_timeout = Duration::from_secs(secs);
        }
        if self.no_welcome {
            config.seed_welcome = false;
        }
        if let Some(cmd) = &self.voice_command {
            config.voice_command = Some(cmd.clone());
        }
        config
    }
}

// Logs go to stderr so they stay out of the transcript on stdout
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=warn", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    init_tracing();

    let config = args.apply(AppConfig::default());
    tracing::debug!("Using config: {:?}", config);

    match args.command {
        Some(Command::Status {}) => {
            status::run(&config).await?;
        }
        Some(Command::Chat {}) | None => {
            chat::run(&config).await?;
        }
    }

    Ok(())
}
