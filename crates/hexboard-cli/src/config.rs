//! Board configuration loading shared by all commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use hexboard_core::BoardConfig;
use tracing::info;

/// Environment variable naming a configuration file when `--config` is absent
pub const CONFIG_ENV: &str = "HEXBOARD_CONFIG";

#[derive(Args, Debug, Clone, Default)]
pub struct BoardArgs {
    /// Board configuration JSON file (falls back to $HEXBOARD_CONFIG, then the standard board)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// RNG seed; overrides any seed in the configuration file
    #[arg(long)]
    pub seed: Option<u64>,
}

impl BoardArgs {
    /// Resolve the configuration these arguments describe
    pub fn load(&self) -> Result<BoardConfig> {
        self.load_with_fallback(std::env::var_os(CONFIG_ENV).map(PathBuf::from))
    }

    /// Resolve the configuration, reading `fallback` when `--config` was not given
    pub fn load_with_fallback(&self, fallback: Option<PathBuf>) -> Result<BoardConfig> {
        let path = self.config.clone().or(fallback);

        let mut config = match path {
            Some(path) => read_config(&path)?,
            None => BoardConfig::standard(),
        };

        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

fn read_config(path: &Path) -> Result<BoardConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read board config {}", path.display()))?;
    let config = BoardConfig::from_json(&json)
        .with_context(|| format!("Invalid board config {}", path.display()))?;
    info!(path = %path.display(), radius = config.grid_radius, "loaded board config");
    Ok(config)
}
