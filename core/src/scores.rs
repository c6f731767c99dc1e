//! High-score archive.
//!
//! Front-ends append a `(name, score)` record when a game ends and can list
//! every record, best first. The engine itself never touches the archive.

#[cfg(feature = "sqlite")]
use std::path::Path;

#[cfg(feature = "sqlite")]
use log::info;
#[cfg(feature = "sqlite")]
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};

/// One archived result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub name: String,
    pub score: u64,
}

impl ScoreRecord {
    /// Build a record, trimming the name. Blank names are rejected.
    pub fn new(name: &str, score: u64) -> GameResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::InvalidName);
        }
        Ok(ScoreRecord {
            name: name.to_string(),
            score,
        })
    }
}

/// Append-only store of finished games.
pub trait ScoreArchive {
    /// Add one record.
    fn append(&mut self, record: &ScoreRecord) -> GameResult<()>;

    /// Every record, highest score first. Equal scores keep insertion order.
    fn ranked(&self) -> GameResult<Vec<ScoreRecord>>;
}

/// In-memory archive.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    records: Vec<ScoreRecord>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreArchive for MemoryArchive {
    fn append(&mut self, record: &ScoreRecord) -> GameResult<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn ranked(&self) -> GameResult<Vec<ScoreRecord>> {
        let mut records = self.records.clone();
        records.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(records)
    }
}

/// Archive backed by a SQLite database.
///
/// Schema:
/// - highscore(id INTEGER PRIMARY KEY, name TEXT, score INTEGER)
#[cfg(feature = "sqlite")]
pub struct SqliteArchive {
    conn: Connection,
}

#[cfg(feature = "sqlite")]
impl SqliteArchive {
    /// Open or create the database at `path`, ensure schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> GameResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Archive that lives only as long as the value.
    pub fn open_in_memory() -> GameResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> GameResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS highscore (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                score INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(Self { conn })
    }
}

#[cfg(feature = "sqlite")]
impl ScoreArchive for SqliteArchive {
    fn append(&mut self, record: &ScoreRecord) -> GameResult<()> {
        let score = i64::try_from(record.score).unwrap_or(i64::MAX);
        self.conn.execute(
            "INSERT INTO highscore (name, score) VALUES (?1, ?2)",
            params![record.name, score],
        )?;
        info!("archived score {} for {}", record.score, record.name);
        Ok(())
    }

    fn ranked(&self) -> GameResult<Vec<ScoreRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, score FROM highscore ORDER BY score DESC, id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(ScoreRecord {
                name: row.get(0)?,
                score: row.get::<_, i64>(1)?.max(0) as u64,
            })
        })?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}
