//! Placement validation.
//!
//! Pure predicates over a `&BoardGraph` deciding whether a settlement or road may
//! be placed. The `validate_*` variants return a permit, which is the only thing
//! `BoardGraph::mark_settlement` and `BoardGraph::mark_road` accept. A permit is
//! bound to the graph state it was issued against: once any other placement lands,
//! older permits are rejected as stale.

use crate::board::BoardGraph;
use crate::hex::{CornerKey, EdgeKey, HexCoord};
use thiserror::Error;

/// Errors applying a placement
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("permit was issued before the board last changed")]
    StalePermit,

    #[error("no corner at {0}")]
    UnknownCorner(CornerKey),

    #[error("no edge at {0}")]
    UnknownEdge(EdgeKey),

    #[error("no tile at {0}")]
    UnknownTile(HexCoord),
}

/// Proof that a settlement may be placed on a corner
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a permit does nothing until passed to BoardGraph::mark_settlement"]
pub struct SettlementPermit {
    pub(crate) corner: CornerKey,
    pub(crate) generation: u64,
}

impl SettlementPermit {
    pub fn corner(&self) -> CornerKey {
        self.corner
    }
}

/// Proof that a road may be placed on an edge
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a permit does nothing until passed to BoardGraph::mark_road"]
pub struct RoadPermit {
    pub(crate) edge: EdgeKey,
    pub(crate) generation: u64,
}

impl RoadPermit {
    pub fn edge(&self) -> EdgeKey {
        self.edge
    }
}

impl BoardGraph {
    /// Check if a settlement may go on a corner.
    ///
    /// The corner must exist, be empty, and have no settlement on any corner one
    /// edge away (the distance rule).
    pub fn is_valid_settlement(&self, key: &CornerKey) -> bool {
        let Some(corner) = self.corners.get(key) else {
            return false;
        };
        if corner.has_settlement {
            return false;
        }
        self.satisfies_distance_rule(key)
    }

    /// Check that no corner adjacent to `key` holds a settlement
    pub fn satisfies_distance_rule(&self, key: &CornerKey) -> bool {
        self.adjacent_corners(key)
            .iter()
            .filter_map(|adj| self.corners.get(adj))
            .all(|adj| !adj.has_settlement)
    }

    /// Check if a road may go on an edge: it must exist and be empty.
    ///
    /// Roads need not connect to existing roads or settlements.
    pub fn is_valid_road(&self, key: &EdgeKey) -> bool {
        self.edges.get(key).is_some_and(|edge| !edge.has_road)
    }

    /// Issue a settlement permit if the corner is a valid spot
    pub fn validate_settlement(&self, key: &CornerKey) -> Option<SettlementPermit> {
        self.is_valid_settlement(key).then(|| SettlementPermit {
            corner: *key,
            generation: self.generation,
        })
    }

    /// Issue a road permit if the edge is a valid spot
    pub fn validate_road(&self, key: &EdgeKey) -> Option<RoadPermit> {
        self.is_valid_road(key).then(|| RoadPermit {
            edge: *key,
            generation: self.generation,
        })
    }

    /// Every corner a settlement could go on right now, sorted
    pub fn valid_settlement_spots(&self) -> Vec<CornerKey> {
        let mut spots: Vec<CornerKey> = self
            .corners
            .keys()
            .filter(|key| self.is_valid_settlement(key))
            .copied()
            .collect();
        spots.sort_unstable();
        spots
    }

    /// Every edge a road could go on right now, sorted
    pub fn valid_road_spots(&self) -> Vec<EdgeKey> {
        let mut spots: Vec<EdgeKey> = self
            .edges
            .keys()
            .filter(|key| self.is_valid_road(key))
            .copied()
            .collect();
        spots.sort_unstable();
        spots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;

    fn board() -> BoardGraph {
        BoardGraph::from_config(&BoardConfig::seeded(11)).unwrap()
    }

    fn settle(board: &mut BoardGraph, key: CornerKey) {
        let permit = board.validate_settlement(&key).expect("corner should be free");
        board.mark_settlement(permit).unwrap();
    }

    #[test]
    fn test_empty_board_accepts_every_corner() {
        let board = board();
        assert_eq!(board.valid_settlement_spots().len(), 54);
        assert_eq!(board.valid_road_spots().len(), 72);
    }

    #[test]
    fn test_distance_rule() {
        let mut board = board();
        let key = HexCoord::new(0, 0).corners()[0];

        assert!(board.satisfies_distance_rule(&key));
        settle(&mut board, key);

        assert!(!board.is_valid_settlement(&key), "Occupied corner is not valid");
        for adj in board.adjacent_corners(&key) {
            assert!(
                !board.is_valid_settlement(&adj),
                "Adjacent corner should fail distance rule"
            );
        }

        // Two steps away is fine
        let two_away = HexCoord::new(0, 0).corners()[2];
        assert!(board.is_valid_settlement(&two_away));
    }

    #[test]
    fn test_unknown_keys_are_invalid() {
        let board = board();
        let far = CornerKey::new(-50, 50);
        assert!(!board.is_valid_settlement(&far));
        assert!(board.validate_settlement(&far).is_none());
        assert!(!board.is_valid_road(&EdgeKey::new(far, CornerKey::new(0, 0))));
    }

    #[test]
    fn test_road_occupancy_is_sticky() {
        let mut board = board();
        let edge = HexCoord::new(1, 0).edges()[3];

        let permit = board.validate_road(&edge).unwrap();
        assert_eq!(permit.edge(), edge);
        board.mark_road(permit).unwrap();

        assert!(!board.is_valid_road(&edge));
        assert!(board.validate_road(&edge).is_none());
        assert_eq!(board.roads(), vec![edge]);
        assert_eq!(board.valid_road_spots().len(), 71);
    }

    #[test]
    fn test_roads_do_not_need_connectivity() {
        let mut board = board();
        let edges = HexCoord::new(-2, 2).edges();
        let permit = board.validate_road(&edges[0]).unwrap();
        board.mark_road(permit).unwrap();

        // A road on the opposite side of the board is still allowed
        assert!(board.is_valid_road(&HexCoord::new(2, -2).edges()[0]));
    }

    #[test]
    fn test_stale_permit_is_rejected() {
        let mut board = board();
        let corners = HexCoord::new(0, 0).corners();

        // Both adjacent corners look valid before either is placed
        let first = board.validate_settlement(&corners[0]).unwrap();
        let second = board.validate_settlement(&corners[1]).unwrap();
        assert_eq!(first.corner(), corners[0]);
        assert_eq!(second.corner(), corners[1]);

        board.mark_settlement(first).unwrap();
        assert_eq!(board.mark_settlement(second), Err(PlacementError::StalePermit));
        assert_eq!(board.settlements(), vec![corners[0]]);

        let road = board.validate_road(&HexCoord::new(0, 0).edges()[2]).unwrap();
        let settlement = board.validate_settlement(&corners[3]).unwrap();
        board.mark_road(road).unwrap();
        assert_eq!(board.mark_settlement(settlement), Err(PlacementError::StalePermit));
    }

    #[test]
    fn test_settlement_blocks_exactly_its_neighbours() {
        let mut board = board();
        let key = HexCoord::new(0, 0).corners()[4];
        settle(&mut board, key);

        let blocked = 1 + board.adjacent_corners(&key).len();
        assert_eq!(board.valid_settlement_spots().len(), 54 - blocked);
    }
}
