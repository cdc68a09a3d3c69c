//! Derives the corner/edge graph from generated tiles.
//!
//! Each tile contributes its six corners and six sides. Whichever tile reaches a
//! corner or side first creates it; later tiles only register themselves on it.
//! Once every tile is in, the graph is checked against the invariants of a hex
//! tiling and any violation aborts the build.

use crate::board::{BoardGraph, Corner, Edge, NumberedTile, Tile};
use crate::generator::TileSpec;
use crate::hex::{CornerKey, EdgeKey, HexCoord};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;
use tracing::debug;

/// Most tiles that can share a corner
const MAX_TILES_PER_CORNER: usize = 3;
/// Most edges that can meet at a corner
const MAX_EDGES_PER_CORNER: usize = 3;
/// Most tiles that can share an edge
const MAX_TILES_PER_EDGE: usize = 2;

/// Errors found while building the board graph
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    #[error("hex size must be a positive finite number, got {0}")]
    InvalidHexSize(f64),

    #[error("no tiles to build a board from")]
    NoTiles,

    #[error("tile {0} appears more than once")]
    DuplicateTile(HexCoord),

    #[error("tile {0} has a number token that does not match its type")]
    NumberMismatch(HexCoord),

    #[error("corner {corner} touches {tiles} tiles")]
    CornerTileOverflow { corner: CornerKey, tiles: usize },

    #[error("corner {corner} has {edges} edges")]
    CornerEdgeOverflow { corner: CornerKey, edges: usize },

    #[error("edge {edge} borders {tiles} tiles")]
    EdgeTileOverflow { edge: EdgeKey, tiles: usize },

    #[error("edge {edge} is not registered on its endpoint {corner}")]
    DanglingEdge { edge: EdgeKey, corner: CornerKey },
}

/// One-shot builder turning tile descriptors into a `BoardGraph`
#[derive(Debug, Clone, Copy)]
pub struct TopologyBuilder {
    hex_size: f64,
}

impl TopologyBuilder {
    pub fn new(hex_size: f64) -> Self {
        Self { hex_size }
    }

    /// Build the graph, failing on any topology inconsistency
    pub fn build(&self, specs: &[TileSpec]) -> Result<BoardGraph, TopologyError> {
        if !(self.hex_size.is_finite() && self.hex_size > 0.0) {
            return Err(TopologyError::InvalidHexSize(self.hex_size));
        }
        if specs.is_empty() {
            return Err(TopologyError::NoTiles);
        }

        let mut tiles: BTreeMap<HexCoord, Tile> = BTreeMap::new();
        let mut corners: HashMap<CornerKey, Corner> = HashMap::new();
        let mut edges: HashMap<EdgeKey, Edge> = HashMap::new();

        for spec in specs {
            if spec.number.is_some() != spec.tile_type.is_productive() {
                return Err(TopologyError::NumberMismatch(spec.coord));
            }
            if tiles.contains_key(&spec.coord) {
                return Err(TopologyError::DuplicateTile(spec.coord));
            }

            let boundary = spec.coord.corners();
            for key in boundary {
                corners
                    .entry(key)
                    .or_insert_with(|| self.new_corner(key))
                    .tiles
                    .insert(spec.coord);
            }

            for i in 0..6 {
                let (start, end) = (boundary[i], boundary[(i + 1) % 6]);
                let key = EdgeKey::new(start, end);
                edges
                    .entry(key)
                    .or_insert_with(|| self.new_edge(key, start, end))
                    .tiles
                    .insert(spec.coord);

                // Endpoints were inserted above
                for endpoint in [start, end] {
                    if let Some(corner) = corners.get_mut(&endpoint) {
                        corner.edges.insert(key);
                    }
                }
            }

            tiles.insert(
                spec.coord,
                Tile {
                    coord: spec.coord,
                    tile_type: spec.tile_type,
                    number: spec.number,
                    center: spec.coord.to_world(self.hex_size),
                    corners: boundary,
                    has_blocker: false,
                },
            );
        }

        validate(&corners, &edges)?;

        let tiles_by_number = index_by_number(&tiles);

        let blocker = tiles
            .values_mut()
            .find(|tile| !tile.tile_type.is_productive())
            .map(|tile| {
                tile.has_blocker = true;
                tile.coord
            });

        debug!(
            tiles = tiles.len(),
            corners = corners.len(),
            edges = edges.len(),
            numbers = tiles_by_number.len(),
            "board topology built"
        );

        Ok(BoardGraph {
            hex_size: self.hex_size,
            tiles,
            corners,
            edges,
            tiles_by_number,
            blocker,
            generation: 0,
        })
    }

    fn new_corner(&self, key: CornerKey) -> Corner {
        Corner {
            key,
            position: key.to_world(self.hex_size),
            edges: BTreeSet::new(),
            tiles: BTreeSet::new(),
            has_settlement: false,
        }
    }

    fn new_edge(&self, key: EdgeKey, start: CornerKey, end: CornerKey) -> Edge {
        Edge {
            key,
            start,
            end,
            tiles: BTreeSet::new(),
            has_road: false,
            midpoint: key.midpoint(self.hex_size),
            length: key.length(self.hex_size),
        }
    }
}

/// Check the degree limits of a hex tiling and that every edge is registered on both ends
fn validate(
    corners: &HashMap<CornerKey, Corner>,
    edges: &HashMap<EdgeKey, Edge>,
) -> Result<(), TopologyError> {
    for corner in corners.values() {
        if corner.tiles.len() > MAX_TILES_PER_CORNER {
            return Err(TopologyError::CornerTileOverflow {
                corner: corner.key,
                tiles: corner.tiles.len(),
            });
        }
        if corner.edges.len() > MAX_EDGES_PER_CORNER {
            return Err(TopologyError::CornerEdgeOverflow {
                corner: corner.key,
                edges: corner.edges.len(),
            });
        }
    }

    for edge in edges.values() {
        if edge.tiles.len() > MAX_TILES_PER_EDGE {
            return Err(TopologyError::EdgeTileOverflow {
                edge: edge.key,
                tiles: edge.tiles.len(),
            });
        }
        for endpoint in [edge.start, edge.end] {
            let registered = corners
                .get(&endpoint)
                .is_some_and(|corner| corner.edges.contains(&edge.key));
            if !registered {
                return Err(TopologyError::DanglingEdge {
                    edge: edge.key,
                    corner: endpoint,
                });
            }
        }
    }

    Ok(())
}

/// Group productive tiles by number token
fn index_by_number(tiles: &BTreeMap<HexCoord, Tile>) -> HashMap<u8, Vec<NumberedTile>> {
    let mut index: HashMap<u8, Vec<NumberedTile>> = HashMap::new();
    for tile in tiles.values() {
        if let (Some(resource), Some(number)) = (tile.resource(), tile.number) {
            index.entry(number).or_default().push(NumberedTile {
                coord: tile.coord,
                resource,
                number,
                corners: tile.corners,
            });
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Resource, TileType};
    use crate::config::BoardConfig;
    use crate::generator::generate_with_seed;

    fn standard_specs(seed: u64) -> Vec<TileSpec> {
        generate_with_seed(&BoardConfig::standard(), seed).unwrap()
    }

    #[test]
    fn test_standard_board_has_54_corners_and_72_edges() {
        let graph = TopologyBuilder::new(1.0).build(&standard_specs(0)).unwrap();
        assert_eq!(graph.tile_count(), 19);
        assert_eq!(graph.corner_count(), 54);
        assert_eq!(graph.edge_count(), 72);
    }

    #[test]
    fn test_counts_do_not_depend_on_hex_size() {
        let graph = TopologyBuilder::new(0.37).build(&standard_specs(1)).unwrap();
        assert_eq!(graph.corner_count(), 54);
        assert_eq!(graph.edge_count(), 72);
    }

    #[test]
    fn test_no_dangling_references() {
        let graph = TopologyBuilder::new(1.0).build(&standard_specs(2)).unwrap();
        for edge in graph.edges() {
            for endpoint in [edge.start, edge.end] {
                let corner = graph.get_corner(&endpoint).expect("endpoint exists");
                assert!(corner.edges.contains(&edge.key));
            }
            assert!(!edge.tiles.is_empty() && edge.tiles.len() <= 2);
        }
        for corner in graph.corners() {
            assert!((2..=3).contains(&corner.edges.len()));
            assert!((1..=3).contains(&corner.tiles.len()));
            for edge in &corner.edges {
                assert!(graph.get_edge(edge).is_some());
            }
        }
    }

    #[test]
    fn test_degree_distribution() {
        // 24 interior corners touch 3 tiles; the 30 on the rim touch 1 or 2
        let graph = TopologyBuilder::new(1.0).build(&standard_specs(3)).unwrap();
        let interior = graph.corners().filter(|c| c.tiles.len() == 3).count();
        assert_eq!(interior, 24);

        // 42 edges lie between two tiles, 30 form the coastline
        let shared = graph.edges().filter(|e| e.tiles.len() == 2).count();
        assert_eq!(shared, 42);
        assert_eq!(graph.edges().filter(|e| e.tiles.len() == 1).count(), 30);
    }

    #[test]
    fn test_edge_tiles_are_shared_by_both_corners() {
        let graph = TopologyBuilder::new(1.0).build(&standard_specs(4)).unwrap();
        for edge in graph.edges() {
            let start = &graph.get_corner(&edge.start).unwrap().tiles;
            let end = &graph.get_corner(&edge.end).unwrap().tiles;
            let common: BTreeSet<HexCoord> = start.intersection(end).copied().collect();
            assert_eq!(edge.tiles, common);
        }
    }

    #[test]
    fn test_number_index() {
        let specs = standard_specs(5);
        let graph = TopologyBuilder::new(1.0).build(&specs).unwrap();

        for number in 2..=12u8 {
            let expected = specs.iter().filter(|s| s.number == Some(number)).count();
            assert_eq!(graph.tiles_for_number(number).len(), expected);
        }
        assert_eq!(graph.tiles_for_number(8).len(), 2);
        assert_eq!(graph.tiles_for_number(2).len(), 1);
        assert!(graph.tiles_for_number(7).is_empty());

        for entry in graph.tiles_for_number(6) {
            let tile = graph.get_tile(&entry.coord).unwrap();
            assert_eq!(tile.corners, entry.corners);
            assert_eq!(tile.resource(), Some(entry.resource));
        }
    }

    #[test]
    fn test_duplicate_tile_is_fatal() {
        let mut specs = standard_specs(6);
        specs.push(specs[3]);
        assert_eq!(
            TopologyBuilder::new(1.0).build(&specs).err(),
            Some(TopologyError::DuplicateTile(specs[3].coord))
        );
    }

    #[test]
    fn test_bad_inputs_are_fatal() {
        assert_eq!(
            TopologyBuilder::new(1.0).build(&[]).err(),
            Some(TopologyError::NoTiles)
        );
        assert!(matches!(
            TopologyBuilder::new(0.0).build(&standard_specs(7)),
            Err(TopologyError::InvalidHexSize(_))
        ));

        let desert_with_number = [TileSpec {
            coord: HexCoord::new(0, 0),
            tile_type: TileType::Desert,
            number: Some(5),
        }];
        assert_eq!(
            TopologyBuilder::new(1.0).build(&desert_with_number).err(),
            Some(TopologyError::NumberMismatch(HexCoord::new(0, 0)))
        );
    }

    #[test]
    fn test_overloaded_corner_is_detected() {
        let key = CornerKey::new(0, 0);
        let mut corner = TopologyBuilder::new(1.0).new_corner(key);
        corner.tiles.extend(HexCoord::new(0, 0).neighbors().into_iter().take(4));
        let corners = HashMap::from([(key, corner)]);

        assert_eq!(
            validate(&corners, &HashMap::new()),
            Err(TopologyError::CornerTileOverflow { corner: key, tiles: 4 })
        );
    }

    #[test]
    fn test_overloaded_corner_edges_are_detected() {
        let builder = TopologyBuilder::new(1.0);
        let key = CornerKey::new(2, 0);
        let mut corner = builder.new_corner(key);
        corner.edges.extend(HexCoord::new(0, 0).edges().into_iter().take(4));
        let corners = HashMap::from([(key, corner)]);

        assert_eq!(
            validate(&corners, &HashMap::new()),
            Err(TopologyError::CornerEdgeOverflow { corner: key, edges: 4 })
        );
    }

    #[test]
    fn test_overloaded_edge_is_detected() {
        let builder = TopologyBuilder::new(1.0);
        let [start, end] = [CornerKey::new(2, 0), CornerKey::new(1, 1)];
        let key = EdgeKey::new(start, end);
        let mut edge = builder.new_edge(key, start, end);
        edge.tiles.extend([HexCoord::new(0, 0), HexCoord::new(1, 0), HexCoord::new(1, -1)]);
        let edges = HashMap::from([(key, edge)]);

        assert_eq!(
            validate(&HashMap::new(), &edges),
            Err(TopologyError::EdgeTileOverflow { edge: key, tiles: 3 })
        );
    }

    #[test]
    fn test_edge_with_missing_endpoint_is_dangling() {
        let builder = TopologyBuilder::new(1.0);
        let [start, end] = [CornerKey::new(1, 1), CornerKey::new(2, 0)];
        let key = EdgeKey::new(start, end);
        let mut edge = builder.new_edge(key, start, end);
        edge.tiles.insert(HexCoord::new(0, 0));
        let edges = HashMap::from([(key, edge)]);

        // Only the end corner exists, and it lists the edge
        let mut end_corner = builder.new_corner(end);
        end_corner.edges.insert(key);
        let corners = HashMap::from([(end, end_corner)]);

        assert_eq!(
            validate(&corners, &edges),
            Err(TopologyError::DanglingEdge { edge: key, corner: start })
        );
    }

    #[test]
    fn test_edge_unknown_to_its_endpoint_is_dangling() {
        let builder = TopologyBuilder::new(1.0);
        let [start, end] = [CornerKey::new(1, 1), CornerKey::new(2, 0)];
        let key = EdgeKey::new(start, end);
        let mut edge = builder.new_edge(key, start, end);
        edge.tiles.insert(HexCoord::new(0, 0));
        let edges = HashMap::from([(key, edge)]);

        // Both corners exist but the end corner never registered the edge
        let mut start_corner = builder.new_corner(start);
        start_corner.edges.insert(key);
        let end_corner = builder.new_corner(end);
        let corners = HashMap::from([(start, start_corner), (end, end_corner)]);

        assert_eq!(
            validate(&corners, &edges),
            Err(TopologyError::DanglingEdge { edge: key, corner: end })
        );
    }

    #[test]
    fn test_built_maps_pass_validation() {
        let graph = TopologyBuilder::new(1.0).build(&standard_specs(8)).unwrap();
        assert_eq!(validate(&graph.corners, &graph.edges), Ok(()));
    }

    #[test]
    fn test_single_tile_board() {
        let specs = [TileSpec {
            coord: HexCoord::new(0, 0),
            tile_type: TileType::Resource(Resource::Ore),
            number: Some(9),
        }];
        let graph = TopologyBuilder::new(1.0).build(&specs).unwrap();
        assert_eq!(graph.corner_count(), 6);
        assert_eq!(graph.edge_count(), 6);
        assert_eq!(graph.blocker(), None);
    }
}
