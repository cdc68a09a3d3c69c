//! A single-player board session.
//!
//! The session owns the `BoardGraph` for the lifetime of one game and turns player
//! requests into graph mutations. A placement becomes authoritative the moment it
//! is validated; the drop animation the presentation layer plays afterwards is
//! cosmetic. While that animation runs, further placements are refused so the
//! player cannot stack pieces faster than they are shown.

use crate::actions::{BoardAction, BoardEvent};
use crate::board::{BoardError, BoardGraph, Resource};
use crate::config::BoardConfig;
use crate::generator;
use crate::hex::{CornerKey, EdgeKey};
use crate::placement::PlacementError;
use crate::production::{roll_dice, BLOCKER_ROLL};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// What a click on the board currently means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlacementMode {
    #[default]
    Idle,
    Settlement,
    Road,
}

impl fmt::Display for PlacementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlacementMode::Idle => "idle",
            PlacementMode::Settlement => "settlement",
            PlacementMode::Road => "road",
        };
        f.write_str(name)
    }
}

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a placement animation is still running")]
    Busy,

    #[error("expected {expected} placement mode, currently {current}")]
    WrongMode {
        expected: PlacementMode,
        current: PlacementMode,
    },

    #[error(transparent)]
    Placement(#[from] PlacementError),
}

/// One board and the player's interaction state
#[derive(Debug, Clone)]
pub struct BoardSession {
    graph: BoardGraph,
    mode: PlacementMode,
    animating: bool,
    last_roll: Option<(u8, u8)>,
    rng: StdRng,
}

impl BoardSession {
    /// Start a session on an existing board
    pub fn new(graph: BoardGraph, seed: Option<u64>) -> Self {
        Self {
            graph,
            mode: PlacementMode::Idle,
            animating: false,
            last_roll: None,
            rng: generator::board_rng(seed),
        }
    }

    /// Generate a board and start a session on it. The config seed drives both the
    /// board layout and the dice.
    pub fn from_config(config: &BoardConfig) -> Result<Self, BoardError> {
        let mut rng = generator::board_rng(config.seed);
        let graph = BoardGraph::from_config_with_rng(config, &mut rng)?;
        Ok(Self {
            graph,
            mode: PlacementMode::Idle,
            animating: false,
            last_roll: None,
            rng,
        })
    }

    pub fn graph(&self) -> &BoardGraph {
        &self.graph
    }

    pub fn mode(&self) -> PlacementMode {
        self.mode
    }

    /// Whether a placed piece is still animating
    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn last_roll(&self) -> Option<(u8, u8)> {
        self.last_roll
    }

    /// Resources a roll of `dice` would collect right now
    pub fn collect(&self, dice: u8) -> HashMap<Resource, u32> {
        self.graph.collect(dice)
    }

    /// Apply an action.
    ///
    /// Placing on an invalid spot is not an error: nothing happens and no events are
    /// returned.
    pub fn apply(&mut self, action: BoardAction) -> Result<Vec<BoardEvent>, SessionError> {
        let mut events = Vec::new();

        match action {
            // ==================== Placement Mode ====================
            BoardAction::BeginSettlementPlacement => {
                self.set_mode(PlacementMode::Settlement, &mut events);
            }
            BoardAction::BeginRoadPlacement => {
                self.set_mode(PlacementMode::Road, &mut events);
            }
            BoardAction::CancelPlacement => {
                self.set_mode(PlacementMode::Idle, &mut events);
            }

            // ==================== Placement ====================
            BoardAction::PlaceSettlement(corner) => {
                self.ensure_ready(PlacementMode::Settlement)?;
                self.place_settlement(corner, &mut events)?;
            }
            BoardAction::PlaceRoad(edge) => {
                self.ensure_ready(PlacementMode::Road)?;
                self.place_road(edge, &mut events)?;
            }
            BoardAction::AnimationFinished => {
                self.animating = false;
            }

            // ==================== Dice and Blocker ====================
            BoardAction::RollDice => {
                let roll = roll_dice(&mut self.rng);
                let total = roll.0 + roll.1;
                self.last_roll = Some(roll);
                events.push(BoardEvent::DiceRolled { roll, total });

                if total != BLOCKER_ROLL {
                    let mut resources: Vec<(Resource, u32)> =
                        self.graph.collect(total).into_iter().collect();
                    if !resources.is_empty() {
                        resources.sort_unstable();
                        events.push(BoardEvent::ResourcesCollected { resources });
                    }
                }
            }
            BoardAction::MoveBlocker(to) => {
                let from = self.graph.move_blocker(to)?;
                events.push(BoardEvent::BlockerMoved { from, to });
            }
        }

        Ok(events)
    }

    fn set_mode(&mut self, mode: PlacementMode, events: &mut Vec<BoardEvent>) {
        if self.mode != mode {
            self.mode = mode;
            events.push(BoardEvent::ModeChanged { mode });
        }
    }

    fn ensure_ready(&self, expected: PlacementMode) -> Result<(), SessionError> {
        if self.animating {
            return Err(SessionError::Busy);
        }
        if self.mode != expected {
            return Err(SessionError::WrongMode {
                expected,
                current: self.mode,
            });
        }
        Ok(())
    }

    fn place_settlement(
        &mut self,
        corner: CornerKey,
        events: &mut Vec<BoardEvent>,
    ) -> Result<(), SessionError> {
        let Some(permit) = self.graph.validate_settlement(&corner) else {
            debug!(corner = %corner, "settlement placement ignored");
            return Ok(());
        };
        let corner = self.graph.mark_settlement(permit)?;
        events.push(BoardEvent::SettlementPlaced { corner });
        self.finish_placement(events);
        Ok(())
    }

    fn place_road(&mut self, edge: EdgeKey, events: &mut Vec<BoardEvent>) -> Result<(), SessionError> {
        let Some(permit) = self.graph.validate_road(&edge) else {
            debug!(edge = %edge, "road placement ignored");
            return Ok(());
        };
        let edge = self.graph.mark_road(permit)?;
        events.push(BoardEvent::RoadPlaced { edge });
        self.finish_placement(events);
        Ok(())
    }

    fn finish_placement(&mut self, events: &mut Vec<BoardEvent>) {
        self.animating = true;
        self.set_mode(PlacementMode::Idle, events);
    }
}
