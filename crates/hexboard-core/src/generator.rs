//! Procedural board generation.
//!
//! Produces the tile descriptors of a hex-disk board: axial coordinates in a fixed
//! order, shuffled terrain, and shuffled number tokens dealt to the productive
//! tiles in that same order (the desert is skipped).

use crate::board::TileType;
use crate::config::{BoardConfig, ConfigError};
use crate::hex::{HexCoord, MAX_DISK_RADIUS};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Reshuffles allowed when keeping 6 and 8 apart
const MAX_ATTEMPTS: usize = 100;

/// A generated tile, before any topology is derived from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSpec {
    pub coord: HexCoord,
    pub tile_type: TileType,
    pub number: Option<u8>,
}

/// RNG for board generation: seeded when a seed is given, from entropy otherwise
pub fn board_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Generate the tiles for a board
pub fn generate<R: Rng>(config: &BoardConfig, rng: &mut R) -> Result<Vec<TileSpec>, ConfigError> {
    config.validate()?;

    let coords = HexCoord::disk(config.grid_radius).ok_or(ConfigError::RadiusTooLarge {
        radius: config.grid_radius,
        max: MAX_DISK_RADIUS,
    })?;

    let mut tile_types = config.tile_counts.to_tile_types();
    tile_types.shuffle(rng);

    let productive_coords: Vec<HexCoord> = coords
        .iter()
        .zip(&tile_types)
        .filter(|(_, tile_type)| tile_type.is_productive())
        .map(|(coord, _)| *coord)
        .collect();

    let numbers = if config.separate_red_numbers {
        assign_numbers_avoiding_adjacent_68(&productive_coords, &config.number_tokens, rng)
    } else {
        let mut numbers = config.number_tokens.clone();
        numbers.shuffle(rng);
        numbers
    };

    let mut numbers = numbers.into_iter();
    let tiles = coords
        .into_iter()
        .zip(tile_types)
        .map(|(coord, tile_type)| TileSpec {
            coord,
            tile_type,
            number: if tile_type.is_productive() {
                numbers.next()
            } else {
                None
            },
        })
        .collect();

    Ok(tiles)
}

/// Generate the tiles for a board from a fixed seed, ignoring `config.seed`
pub fn generate_with_seed(config: &BoardConfig, seed: u64) -> Result<Vec<TileSpec>, ConfigError> {
    generate(config, &mut StdRng::seed_from_u64(seed))
}

/// Shuffle numbers for the productive tiles while trying to avoid 6 and 8 being adjacent
fn assign_numbers_avoiding_adjacent_68<R: Rng>(
    productive_coords: &[HexCoord],
    numbers: &[u8],
    rng: &mut R,
) -> Vec<u8> {
    let mut shuffled_numbers = numbers.to_vec();
    for _ in 0..MAX_ATTEMPTS {
        shuffled_numbers.shuffle(rng);
        if is_valid_number_placement(productive_coords, &shuffled_numbers) {
            return shuffled_numbers;
        }
    }

    warn!("could not separate 6 and 8 after {MAX_ATTEMPTS} shuffles, keeping the last one");
    shuffled_numbers
}

/// Check that no 6 or 8 neighbours another 6 or 8
fn is_valid_number_placement(productive_coords: &[HexCoord], numbers: &[u8]) -> bool {
    let coord_to_number: HashMap<HexCoord, u8> = productive_coords
        .iter()
        .copied()
        .zip(numbers.iter().copied())
        .collect();

    let is_red = |n: u8| n == 6 || n == 8;

    coord_to_number.iter().all(|(coord, &number)| {
        !is_red(number)
            || coord
                .neighbors()
                .iter()
                .filter_map(|neighbor| coord_to_number.get(neighbor))
                .all(|&neighbor_number| !is_red(neighbor_number))
    })
}
