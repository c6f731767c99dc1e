//! Save/load of a session's board and score.
//!
//! [`SaveStore`] is the port the engine saves through. [`JsonFileStore`] keeps
//! each save in a JSON file on disk; [`MemoryStore`] keeps them in a map and is
//! handy for tests and embedding.
//!
//! Save document layout:
//!
//! ```json
//! { "version": 1, "board": [[2, 0], [0, 4]], "score": 12 }
//! ```

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::{GameError, GameResult};
use crate::Snapshot;

/// Current save document version.
pub const SAVE_VERSION: u32 = 1;

/// Somewhere sessions can be saved to and loaded from, keyed by path.
pub trait SaveStore {
    /// Persist `snapshot` under `path`, replacing any earlier save.
    fn save(&self, path: &Path, snapshot: &Snapshot) -> GameResult<()>;

    /// Read back the session saved under `path`.
    fn load(&self, path: &Path) -> GameResult<Snapshot>;
}

#[derive(Serialize, Deserialize)]
struct SaveDocument {
    version: u32,
    board: Vec<Vec<u32>>,
    score: u64,
}

/// Encode a snapshot as a JSON save document.
pub fn encode(snapshot: &Snapshot) -> GameResult<String> {
    let doc = SaveDocument {
        version: SAVE_VERSION,
        board: snapshot.board.to_rows(),
        score: snapshot.score,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Decode and validate a JSON save document.
pub fn decode(text: &str) -> GameResult<Snapshot> {
    let doc: SaveDocument = serde_json::from_str(text)?;
    if doc.version != SAVE_VERSION {
        return Err(GameError::CorruptSave(format!(
            "unsupported save version {}",
            doc.version
        )));
    }
    let board = Board::from_rows(doc.board).map_err(|e| GameError::CorruptSave(e.to_string()))?;
    Ok(Snapshot {
        board,
        score: doc.score,
    })
}

/// Saves each session as a JSON file.
///
/// The document is written to `<path>.tmp` first and then renamed over
/// `path`, so an interrupted save never clobbers the previous one.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileStore;

impl JsonFileStore {
    pub fn new() -> Self {
        JsonFileStore
    }
}

impl SaveStore for JsonFileStore {
    fn save(&self, path: &Path, snapshot: &Snapshot) -> GameResult<()> {
        let text = encode(snapshot)?;
        let tmp = temp_path(path);
        fs::write(&tmp, text)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        info!("saved game to {}", path.display());
        Ok(())
    }

    fn load(&self, path: &Path) -> GameResult<Snapshot> {
        let text = fs::read_to_string(path)?;
        let snapshot = decode(&text).map_err(|e| {
            warn!("rejected save {}: {}", path.display(), e);
            e
        })?;
        info!("loaded game from {}", path.display());
        Ok(snapshot)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Keeps saves in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<PathBuf, Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SaveStore for MemoryStore {
    fn save(&self, path: &Path, snapshot: &Snapshot) -> GameResult<()> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_path_buf(), snapshot.clone());
        Ok(())
    }

    fn load(&self, path: &Path) -> GameResult<Snapshot> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .ok_or_else(|| {
                GameError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no save at {}", path.display()),
                ))
            })
    }
}
