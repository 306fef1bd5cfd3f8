use anyhow::{Context, Result};
use clap::Parser;
use taskboard::{BoardConfig, cli::Cli};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = BoardConfig::from_env().context("failed to load taskboard configuration")?;

    let output = taskboard::cli::run(cli, config).await?;
    print!("{}", output);
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("taskboard=info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
