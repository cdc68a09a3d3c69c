//! Hexboard - board topology and placement engine for a hex-grid settlement game
//!
//! This crate provides the board logic behind a browser-rendered, Catan-style board:
//! - Hex coordinates and canonical corner/edge keys
//! - Board generation with shuffled terrain and number tokens
//! - Derivation of the corner/edge graph from the generated tiles
//! - Settlement and road placement validation
//! - Resource collection on dice rolls
//!
//! # Architecture
//!
//! Rendering lives outside this crate. The engine can be compiled to:
//! - Native Rust, driven by the `hexboard` command-line tool
//! - WebAssembly, driven by the browser front end through [`wasm`]
//!
//! # Modules
//!
//! - [`hex`]: Coordinate system for tiles, corners, and edges
//! - [`config`]: Board configuration
//! - [`generator`]: Procedural tile generation
//! - [`topology`]: Building the board graph from tiles
//! - [`board`]: The board graph and its queries
//! - [`placement`]: Placement validation and permits
//! - [`production`]: Resource collection on dice rolls
//! - [`session`]: Single-player interaction state

pub mod actions;
pub mod board;
pub mod config;
pub mod generator;
pub mod hex;
pub mod placement;
pub mod production;
pub mod session;
pub mod topology;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{BoardAction, BoardEvent};
pub use board::{BoardError, BoardGraph, BoardJson, Corner, Edge, NumberedTile, Resource, Tile, TileType};
pub use config::{BoardConfig, ConfigError, TileCounts, STANDARD_NUMBER_TOKENS};
pub use generator::TileSpec;
pub use hex::{CornerKey, EdgeKey, HexCoord, KeyParseError};
pub use placement::{PlacementError, RoadPermit, SettlementPermit};
pub use production::BLOCKER_ROLL;
pub use session::{BoardSession, PlacementMode, SessionError};
pub use topology::{TopologyBuilder, TopologyError};
