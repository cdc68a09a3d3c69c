//! Actions the presentation layer can request and the events they produce.

use crate::board::Resource;
use crate::hex::{CornerKey, EdgeKey, HexCoord};
use crate::session::PlacementMode;
use serde::{Deserialize, Serialize};

/// All possible requests from the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardAction {
    // ==================== Placement Mode ====================
    /// Start choosing a corner for a settlement
    BeginSettlementPlacement,
    /// Start choosing an edge for a road
    BeginRoadPlacement,
    /// Leave placement mode without placing anything
    CancelPlacement,

    // ==================== Placement ====================
    /// Place a settlement at a corner (must be in settlement mode)
    PlaceSettlement(CornerKey),
    /// Place a road at an edge (must be in road mode)
    PlaceRoad(EdgeKey),
    /// The drop animation of the last placed piece has finished
    AnimationFinished,

    // ==================== Dice and Blocker ====================
    /// Roll the dice and collect resources
    RollDice,
    /// Move the blocker to a tile
    MoveBlocker(HexCoord),
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardEvent {
    /// Placement mode changed
    ModeChanged { mode: PlacementMode },

    /// A settlement was placed
    SettlementPlaced { corner: CornerKey },

    /// A road was placed
    RoadPlaced { edge: EdgeKey },

    /// Dice were rolled
    DiceRolled { roll: (u8, u8), total: u8 },

    /// Resources were collected after a dice roll, sorted by resource
    ResourcesCollected { resources: Vec<(Resource, u32)> },

    /// The blocker was moved
    BlockerMoved { from: Option<HexCoord>, to: HexCoord },
}
