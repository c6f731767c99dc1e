//! # 2048 WebAssembly Bindings
//!
//! This crate provides JavaScript-friendly bindings to the 2048 board engine
//! using wasm-bindgen. It wraps the core engine and exposes a class-like API
//! for a browser front-end that draws the board.

use puzzle_2048_core::{storage, Direction, Game, GameStatus, StepResult};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Result of a step operation, serialized for JavaScript.
#[derive(Serialize)]
pub struct JsStepResult {
    /// The updated board state (size × size elements, row-major order).
    pub board: Vec<u32>,
    /// Current total score.
    pub score: u64,
    /// Points earned from this move.
    pub reward: u64,
    /// Whether the board changed.
    pub changed: bool,
    /// Flat index of the tile spawned after the move, if any.
    pub spawned: Option<usize>,
    /// "in_progress", "won" or "lost".
    pub status: &'static str,
}

/// WebAssembly wrapper for the 2048 game.
#[wasm_bindgen]
pub struct WasmGame {
    game: Game,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a new `size`×`size` game with the given seed.
    ///
    /// The seed is a 64-bit integer used to initialize the deterministic RNG.
    #[wasm_bindgen(constructor)]
    pub fn new(size: usize, seed: u64) -> Result<WasmGame, JsError> {
        let game = Game::new(size, seed)?;
        Ok(WasmGame { game })
    }

    /// Start over on an empty board of the same size.
    pub fn reset(&mut self) {
        self.game.reset();
    }

    /// Execute a move in the given direction.
    ///
    /// Accepts "up", "down", "left", "right" (or "w", "s", "a", "d").
    /// Unknown tokens throw and leave the game untouched.
    ///
    /// Returns a JsValue object containing:
    /// - board: updated tiles, row-major
    /// - score: current total score
    /// - reward: points earned from this move
    /// - changed: whether the board changed
    /// - spawned: flat index of the new tile or null
    /// - status: "in_progress", "won" or "lost"
    pub fn step(&mut self, direction: &str) -> Result<JsValue, JsError> {
        let direction: Direction = direction.parse()?;
        let result = self.game.step(direction);
        self.create_js_result(result)
    }

    /// Get the current board state as a JavaScript Uint32Array.
    #[wasm_bindgen(js_name = getBoard)]
    pub fn get_board(&self) -> Vec<u32> {
        self.game.board().cells().to_vec()
    }

    /// Side length of the board.
    #[wasm_bindgen(js_name = getSize)]
    pub fn get_size(&self) -> usize {
        self.game.size()
    }

    /// Get the current score.
    #[wasm_bindgen(js_name = getScore)]
    pub fn get_score(&self) -> u64 {
        self.game.score()
    }

    /// Check if the game is over, won or lost.
    #[wasm_bindgen(js_name = isTerminal)]
    pub fn is_terminal(&self) -> bool {
        self.game.is_terminal()
    }

    /// Game status: "in_progress", "won" or "lost".
    #[wasm_bindgen(js_name = getStatus)]
    pub fn get_status(&self) -> String {
        status_name(self.game.status()).to_string()
    }

    /// Get the maximum tile value on the board.
    #[wasm_bindgen(js_name = getMaxTile)]
    pub fn get_max_tile(&self) -> u32 {
        self.game.max_tile()
    }

    /// Get legal moves as an array of 4 flags [Up, Down, Left, Right].
    #[wasm_bindgen(js_name = getLegalMoves)]
    pub fn get_legal_moves(&self) -> Vec<u8> {
        self.game
            .legal_moves()
            .iter()
            .map(|&b| if b { 1 } else { 0 })
            .collect()
    }

    /// Serialize board and score as a JSON save document, e.g. for localStorage.
    #[wasm_bindgen(js_name = exportState)]
    pub fn export_state(&self) -> Result<String, JsError> {
        Ok(storage::encode(&self.game.snapshot())?)
    }

    /// Replace board and score with a document from `exportState`.
    ///
    /// Throws on a malformed document; the current game is kept in that case.
    #[wasm_bindgen(js_name = importState)]
    pub fn import_state(&mut self, json: &str) -> Result<(), JsError> {
        let snapshot = storage::decode(json)?;
        self.game.restore(snapshot);
        Ok(())
    }

    /// Helper method to create a JS result object.
    fn create_js_result(&self, result: StepResult) -> Result<JsValue, JsError> {
        let size = self.game.size();
        let js_result = JsStepResult {
            board: self.game.board().cells().to_vec(),
            score: self.game.score(),
            reward: result.reward,
            changed: result.changed,
            spawned: result.spawned.map(|s| s.row * size + s.col),
            status: status_name(result.status),
        };
        Ok(serde_wasm_bindgen::to_value(&js_result)?)
    }
}

fn status_name(status: GameStatus) -> &'static str {
    match status {
        GameStatus::InProgress => "in_progress",
        GameStatus::Won => "won",
        GameStatus::Lost => "lost",
    }
}
