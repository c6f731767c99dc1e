//! Error types for the 2048 engine and its storage ports.

use thiserror::Error;

/// Errors surfaced by the engine, the save store and the score archive.
///
/// None of these are fatal: callers report them and keep the session alive.
#[derive(Error, Debug)]
pub enum GameError {
    /// Input token is not one of the recognized directions
    #[error("Invalid direction: {0:?} (expected up, down, left or right)")]
    InvalidDirection(String),

    /// Board side too small to play on
    #[error("Invalid board size: {0} (must be at least 2)")]
    InvalidSize(usize),

    /// Grid is not square or holds a value that is not a tile
    #[error("Invalid board: {0}")]
    InvalidBoard(String),

    /// High-score entry without a player name
    #[error("Player name must not be empty")]
    InvalidName,

    /// Save file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Save file exists but does not hold a valid game
    #[error("Corrupt save: {0}")]
    CorruptSave(String),

    /// High-score database failure
    #[cfg(feature = "sqlite")]
    #[error("Score archive error: {0}")]
    Archive(#[from] rusqlite::Error),
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::CorruptSave(err.to_string())
    }
}

/// Result type alias for engine operations
pub type GameResult<T> = Result<T, GameError>;
