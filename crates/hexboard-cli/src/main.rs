//! Hexboard command-line driver.
//!
//! Commands:
//! - generate: Build a board and print it as JSON
//! - simulate: Play random valid placements and dice rolls on a board

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod generate;
mod simulate;

#[derive(Parser)]
#[command(name = "hexboard")]
#[command(about = "Generate and exercise hex settlement boards")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a board and print it as JSON
    Generate(generate::GenerateArgs),
    /// Run a scripted session with random valid placements and dice rolls
    Simulate(simulate::SimulateArgs),
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => generate::run(args),
        Commands::Simulate(args) => simulate::run(args),
    }
}
