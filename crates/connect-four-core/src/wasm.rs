//! WebAssembly bindings for local play in the browser.
//!
//! Player identities are plain strings on this side of the boundary.

use wasm_bindgen::prelude::*;

use crate::actions::Command;
use crate::round::Round;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed round wrapper
#[wasm_bindgen]
pub struct WasmRound {
    round: Round<String>,
}

impl Default for WasmRound {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WasmRound {
    /// Create an empty round with no history
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmRound {
        WasmRound {
            round: Round::new(),
        }
    }

    /// Get the round snapshot as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        serde_json::to_string(&self.round.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Apply a command from JSON, returns events JSON or error
    #[wasm_bindgen(js_name = applyCommand)]
    pub fn apply_command(&mut self, player: &str, command_json: &str) -> Result<String, JsValue> {
        let command: Command = serde_json::from_str(command_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid command JSON: {}", e)))?;

        match self.round.apply(&player.to_string(), command) {
            Ok(events) => {
                Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string()))
            }
            Err(e) => Err(JsValue::from_str(&format!("Command failed: {}", e))),
        }
    }

    /// Row a disc dropped into `column` would land on, or -1 when full
    #[wasm_bindgen(js_name = landingRow)]
    pub fn landing_row(&self, column: usize) -> i32 {
        self.round
            .board()
            .landing_row(column)
            .map_or(-1, |row| row as i32)
    }

    /// Check if the round is over
    #[wasm_bindgen(js_name = isOver)]
    pub fn is_over(&self) -> bool {
        self.round.is_over()
    }

    /// Replace a finished round with its successor so the same players
    /// can play again. Returns false if the round is still running.
    #[wasm_bindgen(js_name = nextRound)]
    pub fn next_round(&mut self) -> bool {
        match self.round.successor() {
            Some(next) => {
                self.round = next;
                true
            }
            None => false,
        }
    }
}
