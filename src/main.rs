// Keyrack — Application Entry Point
//
// Loads configuration, initializes structured logging, parses CLI arguments,
// and dispatches to the command handler.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use keyrack::cli::{execute, Cli};
use keyrack::config::{load_env_file, Config};

#[tokio::main]
async fn main() {
    let env_file = load_env_file();
    let config = Config::from_env();

    // RUST_LOG wins over KEYRACK_LOG. No level ever includes credential values.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_target(false)
        .init();

    if let Err(e) = env_file {
        tracing::warn!("Ignoring .env file: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = execute(cli.command, &config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
