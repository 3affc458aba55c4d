use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use densitas::cli::{Cli, Commands};
use densitas::commands::{check_config, classify};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match cli.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match &cli.command {
        Commands::Classify(args) => classify::run(&cli, args),
        Commands::CheckConfig(args) => check_config::run(&cli, args),
    }
}
