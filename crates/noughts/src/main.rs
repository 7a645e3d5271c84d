use std::time::Duration;

use clap::Parser;
use noughts::prelude::*;
use tracing_subscriber::EnvFilter;

/// Multiplayer tic-tac-toe session server.
#[derive(Debug, Parser)]
#[command(name = "noughts", version, about)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "NOUGHTS_BIND", default_value = DEFAULT_BIND_ADDR)]
    bind: String,

    /// Mint random session ids instead of game-1, game-2, ...
    #[arg(long, env = "NOUGHTS_RANDOM_IDS")]
    random_ids: bool,

    /// Close connections that stay silent for this many seconds.
    #[arg(long, env = "NOUGHTS_IDLE_TIMEOUT_SECS", default_value_t = DEFAULT_IDLE_TIMEOUT.as_secs())]
    idle_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), NoughtsError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let id_strategy = if args.random_ids {
        IdStrategy::Random
    } else {
        IdStrategy::Sequential
    };

    let server = NoughtsServer::builder()
        .bind(&args.bind)
        .registry_config(RegistryConfig {
            id_strategy,
            ..RegistryConfig::default()
        })
        .idle_timeout(Duration::from_secs(args.idle_timeout_secs))
        .build()
        .await?;

    server.run().await
}
