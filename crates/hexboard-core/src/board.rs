//! Board graph: tiles, corners, and edges with occupancy state.
//!
//! This module contains:
//! - Resource and tile types
//! - The `Tile`, `Corner`, and `Edge` entities
//! - `BoardGraph`, which owns all of them and answers lookups
//! - The two occupancy mutations, which only accept permits issued by the
//!   placement validator
//!
//! Entities refer to each other by key (`HexCoord`, `CornerKey`, `EdgeKey`), never
//! by reference; every relationship is resolved through the graph's maps.

use crate::config::{BoardConfig, ConfigError};
use crate::generator;
use crate::hex::{CornerKey, EdgeKey, HexCoord};
use crate::placement::{PlacementError, RoadPermit, SettlementPermit};
use crate::topology::{TopologyBuilder, TopologyError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;
use tracing::{info, warn};

/// Resources produced by tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    Lumber,
    Brick,
    Ore,
    Grain,
    Wool,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Lumber,
        Resource::Brick,
        Resource::Ore,
        Resource::Grain,
        Resource::Wool,
    ];

    /// Lowercase display name
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Lumber => "lumber",
            Resource::Brick => "brick",
            Resource::Ore => "ore",
            Resource::Grain => "grain",
            Resource::Wool => "wool",
        }
    }
}

/// Type of hex tile on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    /// Produces a resource when its number is rolled
    Resource(Resource),
    /// No production, carries no number token
    Desert,
}

impl TileType {
    /// Whether tiles of this type carry a number token
    pub fn is_productive(&self) -> bool {
        matches!(self, TileType::Resource(_))
    }

    /// The resource this type produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self {
            TileType::Resource(r) => Some(*r),
            TileType::Desert => None,
        }
    }
}

/// A single hex tile on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Position on the hex grid
    pub coord: HexCoord,
    pub tile_type: TileType,
    /// Dice number that triggers production (2-12, None for desert)
    pub number: Option<u8>,
    /// World-space centre (x, z)
    pub center: (f64, f64),
    /// Boundary corners in rotational order
    pub corners: [CornerKey; 6],
    /// Whether the blocker currently sits on this tile
    pub has_blocker: bool,
}

impl Tile {
    /// Get the resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        self.tile_type.resource()
    }

    /// Whether a roll of this tile's number currently yields anything
    pub fn is_producing(&self) -> bool {
        self.tile_type.is_productive() && !self.has_blocker
    }
}

/// A corner shared by up to three tiles; where settlements go
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corner {
    pub key: CornerKey,
    /// World-space position (x, z)
    pub position: (f64, f64),
    /// Incident edges (at most 3)
    pub edges: BTreeSet<EdgeKey>,
    /// Tiles touching this corner (at most 3)
    pub tiles: BTreeSet<HexCoord>,
    pub has_settlement: bool,
}

/// A side between two corners, bordered by up to two tiles; where roads go
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub key: EdgeKey,
    pub start: CornerKey,
    pub end: CornerKey,
    /// Tiles bordering this edge (at most 2)
    pub tiles: BTreeSet<HexCoord>,
    pub has_road: bool,
    /// World-space midpoint (x, z)
    pub midpoint: (f64, f64),
    pub length: f64,
}

impl Edge {
    /// The endpoint opposite `corner`
    pub fn other_end(&self, corner: CornerKey) -> Option<CornerKey> {
        self.key.other_end(corner)
    }
}

/// Entry of the number index: a productive tile and the corners it pays out to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberedTile {
    pub coord: HexCoord,
    pub resource: Resource,
    pub number: u8,
    pub corners: [CornerKey; 6],
}

/// Errors building a board from configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoardError {
    #[error("invalid board configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("inconsistent board topology: {0}")]
    Topology(#[from] TopologyError),
}

/// The board graph
#[derive(Debug, Clone)]
pub struct BoardGraph {
    pub(crate) hex_size: f64,
    pub(crate) tiles: BTreeMap<HexCoord, Tile>,
    pub(crate) corners: HashMap<CornerKey, Corner>,
    pub(crate) edges: HashMap<EdgeKey, Edge>,
    /// Productive tiles grouped by number token, built once
    pub(crate) tiles_by_number: HashMap<u8, Vec<NumberedTile>>,
    pub(crate) blocker: Option<HexCoord>,
    /// Bumped on every occupancy change; permits from older generations are stale
    pub(crate) generation: u64,
}

impl BoardGraph {
    /// Create the standard board with random terrain and numbers
    pub fn standard() -> Result<Self, BoardError> {
        Self::from_config(&BoardConfig::standard())
    }

    /// Create a board from configuration, honouring its seed if set
    pub fn from_config(config: &BoardConfig) -> Result<Self, BoardError> {
        let mut rng = generator::board_rng(config.seed);
        Self::from_config_with_rng(config, &mut rng)
    }

    /// Create a board from configuration with a provided RNG
    pub fn from_config_with_rng<R: Rng>(config: &BoardConfig, rng: &mut R) -> Result<Self, BoardError> {
        let tiles = generator::generate(config, rng)?;
        let graph = TopologyBuilder::new(config.hex_size).build(&tiles)?;
        Ok(graph)
    }

    // ==================== Query Methods ====================

    /// Tile size used for all world-space positions
    pub fn hex_size(&self) -> f64 {
        self.hex_size
    }

    /// Get a tile by coordinate
    pub fn get_tile(&self, coord: &HexCoord) -> Option<&Tile> {
        self.tiles.get(coord)
    }

    /// All tiles, ordered by coordinate
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn get_corner(&self, key: &CornerKey) -> Option<&Corner> {
        self.corners.get(key)
    }

    pub fn corners(&self) -> impl Iterator<Item = &Corner> {
        self.corners.values()
    }

    pub fn get_edge(&self, key: &EdgeKey) -> Option<&Edge> {
        self.edges.get(key)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn corner_count(&self) -> usize {
        self.corners.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Productive tiles bearing number `n`; empty for numbers no tile carries
    pub fn tiles_for_number(&self, n: u8) -> &[NumberedTile] {
        self.tiles_by_number.get(&n).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Corners one edge away from `key`; empty for unknown corners
    pub fn adjacent_corners(&self, key: &CornerKey) -> BTreeSet<CornerKey> {
        let Some(corner) = self.corners.get(key) else {
            return BTreeSet::new();
        };
        corner
            .edges
            .iter()
            .filter_map(|edge| edge.other_end(*key))
            .collect()
    }

    /// The corner at a world-space point, if one is close enough
    pub fn corner_at(&self, x: f64, z: f64) -> Option<&Corner> {
        CornerKey::from_world(x, z, self.hex_size).and_then(|key| self.corners.get(&key))
    }

    /// The tile containing a world-space point
    pub fn tile_at(&self, x: f64, z: f64) -> Option<&Tile> {
        self.tiles.get(&HexCoord::from_world(x, z, self.hex_size))
    }

    /// The edge joining two corners, if they are adjacent
    pub fn edge_between(&self, a: CornerKey, b: CornerKey) -> Option<&Edge> {
        self.edges.get(&EdgeKey::new(a, b))
    }

    /// Where the blocker currently sits
    pub fn blocker(&self) -> Option<HexCoord> {
        self.blocker
    }

    /// Corners holding a settlement, sorted
    pub fn settlements(&self) -> Vec<CornerKey> {
        let mut keys: Vec<CornerKey> = self
            .corners
            .values()
            .filter(|c| c.has_settlement)
            .map(|c| c.key)
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Edges holding a road, sorted
    pub fn roads(&self) -> Vec<EdgeKey> {
        let mut keys: Vec<EdgeKey> = self
            .edges
            .values()
            .filter(|e| e.has_road)
            .map(|e| e.key)
            .collect();
        keys.sort_unstable();
        keys
    }

    // ==================== Mutation Methods ====================

    /// Place a settlement on the corner the permit was issued for
    pub fn mark_settlement(&mut self, permit: SettlementPermit) -> Result<CornerKey, PlacementError> {
        self.check_generation(permit.generation)?;
        let corner = self
            .corners
            .get_mut(&permit.corner)
            .ok_or(PlacementError::UnknownCorner(permit.corner))?;
        corner.has_settlement = true;
        self.generation += 1;
        info!(corner = %permit.corner, "settlement placed");
        Ok(permit.corner)
    }

    /// Place a road on the edge the permit was issued for
    pub fn mark_road(&mut self, permit: RoadPermit) -> Result<EdgeKey, PlacementError> {
        self.check_generation(permit.generation)?;
        let edge = self
            .edges
            .get_mut(&permit.edge)
            .ok_or(PlacementError::UnknownEdge(permit.edge))?;
        edge.has_road = true;
        self.generation += 1;
        info!(edge = %permit.edge, "road placed");
        Ok(permit.edge)
    }

    fn check_generation(&self, issued: u64) -> Result<(), PlacementError> {
        if issued != self.generation {
            warn!(issued, current = self.generation, "rejected stale placement permit");
            return Err(PlacementError::StalePermit);
        }
        Ok(())
    }

    /// Move the blocker to a tile, returning where it was
    pub fn move_blocker(&mut self, to: HexCoord) -> Result<Option<HexCoord>, PlacementError> {
        if !self.tiles.contains_key(&to) {
            return Err(PlacementError::UnknownTile(to));
        }

        let previous = self.blocker.take();
        if let Some(tile) = previous.and_then(|from| self.tiles.get_mut(&from)) {
            tile.has_blocker = false;
        }
        if let Some(tile) = self.tiles.get_mut(&to) {
            tile.has_blocker = true;
        }
        self.blocker = Some(to);
        info!(to = %to, "blocker moved");
        Ok(previous)
    }

    /// Convert to a JSON-friendly representation with arrays and text keys
    pub fn to_json_friendly(&self) -> BoardJson {
        let mut corners: Vec<&Corner> = self.corners.values().collect();
        corners.sort_unstable_by_key(|c| c.key);
        let mut edges: Vec<&Edge> = self.edges.values().collect();
        edges.sort_unstable_by_key(|e| e.key);

        BoardJson {
            hex_size: self.hex_size,
            tiles: self
                .tiles
                .values()
                .map(|tile| TileJson {
                    q: tile.coord.q,
                    r: tile.coord.r,
                    tile_type: tile.tile_type,
                    number: tile.number,
                    has_blocker: tile.has_blocker,
                    x: tile.center.0,
                    z: tile.center.1,
                    corners: tile.corners.iter().map(ToString::to_string).collect(),
                })
                .collect(),
            corners: corners
                .into_iter()
                .map(|corner| CornerJson {
                    key: corner.key.to_string(),
                    x: corner.position.0,
                    z: corner.position.1,
                    has_settlement: corner.has_settlement,
                    edges: corner.edges.iter().map(ToString::to_string).collect(),
                })
                .collect(),
            edges: edges
                .into_iter()
                .map(|edge| EdgeJson {
                    key: edge.key.to_string(),
                    start: edge.start.to_string(),
                    end: edge.end.to_string(),
                    has_road: edge.has_road,
                    x: edge.midpoint.0,
                    z: edge.midpoint.1,
                    length: edge.length,
                })
                .collect(),
            blocker: self.blocker,
        }
    }
}

/// JSON-friendly board representation with arrays instead of maps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardJson {
    pub hex_size: f64,
    pub tiles: Vec<TileJson>,
    pub corners: Vec<CornerJson>,
    pub edges: Vec<EdgeJson>,
    pub blocker: Option<HexCoord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileJson {
    pub q: i32,
    pub r: i32,
    pub tile_type: TileType,
    pub number: Option<u8>,
    pub has_blocker: bool,
    pub x: f64,
    pub z: f64,
    pub corners: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CornerJson {
    pub key: String,
    pub x: f64,
    pub z: f64,
    pub has_settlement: bool,
    pub edges: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeJson {
    pub key: String,
    pub start: String,
    pub end: String,
    pub has_road: bool,
    pub x: f64,
    pub z: f64,
    pub length: f64,
}
