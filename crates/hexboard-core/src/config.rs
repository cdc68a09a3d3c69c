//! Board configuration.
//!
//! The standard board is a radius-2 disk of 19 tiles with the classic terrain and
//! number token distribution. Other layouts can be described by supplying a
//! configuration whose tables add up for the chosen radius.

use crate::board::{Resource, TileType};
use crate::hex::{HexCoord, MAX_DISK_RADIUS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard number tokens: one each of 2 and 12, two each of 3-6 and 8-11
pub const STANDARD_NUMBER_TOKENS: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// Errors in a board configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("hex size must be a positive finite number, got {0}")]
    InvalidHexSize(f64),

    #[error("grid radius {radius} is larger than the maximum of {max}")]
    RadiusTooLarge { radius: u32, max: u32 },

    #[error("radius {radius} needs {expected} tiles but the terrain table holds {actual}")]
    TileCountMismatch {
        radius: u32,
        expected: u64,
        actual: u64,
    },

    #[error("{productive} productive tiles need as many number tokens, got {tokens}")]
    TokenCountMismatch { productive: u64, tokens: usize },

    #[error("number token {0} is outside 2..=12 or is 7")]
    InvalidToken(u8),

    #[error("invalid configuration JSON: {0}")]
    Parse(String),
}

/// How many tiles of each terrain the board holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileCounts {
    pub desert: u32,
    pub lumber: u32,
    pub brick: u32,
    pub grain: u32,
    pub wool: u32,
    pub ore: u32,
}

impl TileCounts {
    /// 1 desert, 4 lumber, 3 brick, 4 grain, 4 wool, 3 ore
    pub const STANDARD: TileCounts = TileCounts {
        desert: 1,
        lumber: 4,
        brick: 3,
        grain: 4,
        wool: 4,
        ore: 3,
    };

    /// Total number of tiles. Six `u32` counts always fit a `u64` sum.
    pub fn total(&self) -> u64 {
        u64::from(self.desert) + self.productive()
    }

    /// Number of tiles that carry a number token
    pub fn productive(&self) -> u64 {
        [self.lumber, self.brick, self.grain, self.wool, self.ore]
            .into_iter()
            .map(u64::from)
            .sum()
    }

    /// The unshuffled terrain sequence
    pub fn to_tile_types(&self) -> Vec<TileType> {
        let table = [
            (TileType::Desert, self.desert),
            (TileType::Resource(Resource::Lumber), self.lumber),
            (TileType::Resource(Resource::Brick), self.brick),
            (TileType::Resource(Resource::Grain), self.grain),
            (TileType::Resource(Resource::Wool), self.wool),
            (TileType::Resource(Resource::Ore), self.ore),
        ];
        table
            .into_iter()
            .flat_map(|(tile_type, count)| std::iter::repeat(tile_type).take(count as usize))
            .collect()
    }
}

impl Default for TileCounts {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Everything needed to generate and build a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Rings of tiles around the centre tile
    pub grid_radius: u32,
    /// Centre-to-corner distance of a tile in world units
    pub hex_size: f64,
    pub tile_counts: TileCounts,
    pub number_tokens: Vec<u8>,
    /// Reshuffle tokens so 6 and 8 never land on neighbouring tiles
    pub separate_red_numbers: bool,
    /// Fixed RNG seed; boards are random when absent
    pub seed: Option<u64>,
}

impl BoardConfig {
    /// The standard 19-tile board
    pub fn standard() -> Self {
        Self {
            grid_radius: 2,
            hex_size: 1.0,
            tile_counts: TileCounts::STANDARD,
            number_tokens: STANDARD_NUMBER_TOKENS.to_vec(),
            separate_red_numbers: false,
            seed: None,
        }
    }

    /// The standard board with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::standard()
        }
    }

    /// Parse and validate a configuration from JSON. Missing fields take standard values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: BoardConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the tables fit the radius and the tokens are legal
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.hex_size.is_finite() && self.hex_size > 0.0) {
            return Err(ConfigError::InvalidHexSize(self.hex_size));
        }

        let expected = HexCoord::disk_size(self.grid_radius).ok_or(ConfigError::RadiusTooLarge {
            radius: self.grid_radius,
            max: MAX_DISK_RADIUS,
        })? as u64;
        let actual = self.tile_counts.total();
        if expected != actual {
            return Err(ConfigError::TileCountMismatch {
                radius: self.grid_radius,
                expected,
                actual,
            });
        }

        let productive = self.tile_counts.productive();
        if productive != self.number_tokens.len() as u64 {
            return Err(ConfigError::TokenCountMismatch {
                productive,
                tokens: self.number_tokens.len(),
            });
        }

        if let Some(&bad) = self
            .number_tokens
            .iter()
            .find(|&&n| !(2..=12).contains(&n) || n == 7)
        {
            return Err(ConfigError::InvalidToken(bad));
        }

        Ok(())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::standard()
    }
}
