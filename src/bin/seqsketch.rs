//! seqsketch CLI - MinHash sketches of DNA and protein sequences
//!
//! Computes signatures from sequence files, compares them into similarity
//! matrices, searches collections and manages configuration files.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config;

    match cli.command {
        Commands::Compute(args) => {
            cli::compute_command(args, config_path).await?;
        }
        Commands::Compare(args) => {
            cli::compare_command(args, config_path).await?;
        }
        Commands::Search(args) => {
            cli::search_command(args, config_path).await?;
        }
        Commands::Plot(args) => {
            cli::plot_command(args, config_path).await?;
        }
        Commands::ImportCsv(args) => {
            cli::import_csv_command(args, config_path).await?;
        }
        Commands::PrintDefaultConfig => {
            cli::print_default_config().await?;
        }
        Commands::InitConfig(args) => {
            cli::init_config(args).await?;
        }
        Commands::ValidateConfig(args) => {
            cli::validate_config(args).await?;
        }
    }

    Ok(())
}
