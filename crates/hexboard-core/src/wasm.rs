//! WebAssembly bindings for the board engine.
//!
//! This module exposes a board session to JavaScript through wasm-bindgen. Keys
//! cross the boundary in their text form (`"u,v"` for corners, `"u,v/u,v"` for
//! edges) and structured results as JSON strings.

use wasm_bindgen::prelude::*;

use crate::actions::BoardAction;
use crate::config::BoardConfig;
use crate::hex::{CornerKey, EdgeKey};
use crate::session::BoardSession;
use std::collections::BTreeMap;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed board session
#[wasm_bindgen]
pub struct WasmBoard {
    session: BoardSession,
}

#[wasm_bindgen]
impl WasmBoard {
    /// Create a board from a JSON configuration; an empty string means the standard board
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmBoard, JsValue> {
        let config = if config_json.trim().is_empty() {
            BoardConfig::standard()
        } else {
            BoardConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?
        };

        let session =
            BoardSession::from_config(&config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmBoard { session })
    }

    /// Get board state as JSON (for rendering)
    #[wasm_bindgen(js_name = getBoard)]
    pub fn get_board(&self) -> String {
        let board_json = self.session.graph().to_json_friendly();
        serde_json::to_string(&board_json).unwrap_or_else(|_| "{}".to_string())
    }

    /// Current placement mode: "idle", "settlement" or "road"
    #[wasm_bindgen(js_name = getMode)]
    pub fn get_mode(&self) -> String {
        self.session.mode().to_string()
    }

    #[wasm_bindgen(js_name = isAnimating)]
    pub fn is_animating(&self) -> bool {
        self.session.is_animating()
    }

    /// Get the last dice roll (if any)
    #[wasm_bindgen(js_name = getDiceRoll)]
    pub fn get_dice_roll(&self) -> Option<Vec<u8>> {
        self.session.last_roll().map(|(a, b)| vec![a, b])
    }

    /// Corner key nearest to a world-space point, if it is a corner of this board
    #[wasm_bindgen(js_name = cornerAt)]
    pub fn corner_at(&self, x: f64, z: f64) -> Option<String> {
        self.session.graph().corner_at(x, z).map(|c| c.key.to_string())
    }

    #[wasm_bindgen(js_name = isValidSettlement)]
    pub fn is_valid_settlement(&self, corner: &str) -> bool {
        corner
            .parse::<CornerKey>()
            .is_ok_and(|key| self.session.graph().is_valid_settlement(&key))
    }

    #[wasm_bindgen(js_name = isValidRoad)]
    pub fn is_valid_road(&self, edge: &str) -> bool {
        edge.parse::<EdgeKey>()
            .is_ok_and(|key| self.session.graph().is_valid_road(&key))
    }

    /// Corners to highlight in settlement mode, as a JSON array of keys
    #[wasm_bindgen(js_name = validSettlementSpots)]
    pub fn valid_settlement_spots(&self) -> String {
        let spots: Vec<String> = self
            .session
            .graph()
            .valid_settlement_spots()
            .iter()
            .map(ToString::to_string)
            .collect();
        serde_json::to_string(&spots).unwrap_or_else(|_| "[]".to_string())
    }

    /// Edges to highlight in road mode, as a JSON array of keys
    #[wasm_bindgen(js_name = validRoadSpots)]
    pub fn valid_road_spots(&self) -> String {
        let spots: Vec<String> = self
            .session
            .graph()
            .valid_road_spots()
            .iter()
            .map(ToString::to_string)
            .collect();
        serde_json::to_string(&spots).unwrap_or_else(|_| "[]".to_string())
    }

    /// Apply an action from JSON, returns events JSON or error
    #[wasm_bindgen(js_name = applyAction)]
    pub fn apply_action(&mut self, action_json: &str) -> Result<String, JsValue> {
        let action: BoardAction = serde_json::from_str(action_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid action JSON: {}", e)))?;
        self.apply(action)
    }

    /// Place a settlement by corner key; returns events JSON (empty when the spot is invalid)
    #[wasm_bindgen(js_name = placeSettlement)]
    pub fn place_settlement(&mut self, corner: &str) -> Result<String, JsValue> {
        let key = corner
            .parse::<CornerKey>()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.apply(BoardAction::PlaceSettlement(key))
    }

    /// Place a road by edge key; returns events JSON (empty when the spot is invalid)
    #[wasm_bindgen(js_name = placeRoad)]
    pub fn place_road(&mut self, edge: &str) -> Result<String, JsValue> {
        let key = edge
            .parse::<EdgeKey>()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.apply(BoardAction::PlaceRoad(key))
    }

    /// Resources a roll would collect, as a JSON object keyed by resource name
    #[wasm_bindgen(js_name = collect)]
    pub fn collect(&self, dice: u8) -> String {
        let collected: BTreeMap<&'static str, u32> = self
            .session
            .collect(dice)
            .into_iter()
            .map(|(resource, count)| (resource.name(), count))
            .collect();
        serde_json::to_string(&collected).unwrap_or_else(|_| "{}".to_string())
    }

    fn apply(&mut self, action: BoardAction) -> Result<String, JsValue> {
        match self.session.apply(action) {
            Ok(events) => Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())),
            Err(e) => Err(JsValue::from_str(&format!("Action failed: {}", e))),
        }
    }
}
