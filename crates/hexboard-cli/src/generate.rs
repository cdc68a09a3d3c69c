//! Generate command - build a board and dump it as JSON

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use hexboard_core::BoardGraph;
use tracing::info;

use crate::config::BoardArgs;

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub board: BoardArgs,

    /// Pretty-print the JSON
    #[arg(long)]
    pub pretty: bool,

    /// Write to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let config = args.board.load()?;
    let board = BoardGraph::from_config(&config).context("Failed to build board")?;
    info!(
        tiles = board.tile_count(),
        corners = board.corner_count(),
        edges = board.edge_count(),
        "board generated"
    );

    let snapshot = board.to_json_friendly();
    let json = if args.pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        serde_json::to_string(&snapshot)?
    };

    match args.output {
        Some(path) => std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}
