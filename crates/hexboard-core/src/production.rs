//! Resource collection on dice rolls.

use crate::board::{BoardGraph, Resource, Tile};
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

/// The roll that pays out nothing
pub const BLOCKER_ROLL: u8 = 7;

/// Roll two six-sided dice
pub fn roll_dice<R: Rng>(rng: &mut R) -> (u8, u8) {
    (rng.gen_range(1..=6), rng.gen_range(1..=6))
}

impl BoardGraph {
    /// Calculate resources collected for a dice roll.
    ///
    /// Every settlement on the boundary of a tile bearing `dice` collects one unit of
    /// that tile's resource, unless the blocker sits on the tile. A settlement
    /// touching several matching tiles collects from each. A 7 collects nothing.
    pub fn collect(&self, dice: u8) -> HashMap<Resource, u32> {
        let mut collected: HashMap<Resource, u32> = HashMap::new();
        if dice == BLOCKER_ROLL {
            return collected;
        }

        for entry in self.tiles_for_number(dice) {
            if !self.get_tile(&entry.coord).is_some_and(Tile::is_producing) {
                debug!(tile = %entry.coord, "blocked tile skipped");
                continue;
            }

            let settlements = entry
                .corners
                .iter()
                .filter(|key| self.get_corner(key).is_some_and(|c| c.has_settlement))
                .count() as u32;

            if settlements > 0 {
                *collected.entry(entry.resource).or_insert(0) += settlements;
            }
        }

        debug!(dice, ?collected, "resources collected");
        collected
    }
}
