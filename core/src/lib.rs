//! # 2048 Board Engine
//!
//! Game logic for the 2048 sliding tile puzzle on an N×N board: move
//! resolution, tile spawning and terminal-state detection. The random source
//! is a type parameter so front-ends can seed it and tests can script it.
//! Save files and high-score archives are reached through the [`SaveStore`]
//! and [`ScoreArchive`] ports.
//!
//! ## Example
//!
//! ```rust
//! use puzzle_2048_core::{Direction, Game};
//!
//! let mut game = Game::new(4, 42).unwrap();
//! let result = game.step(Direction::Left);
//! println!("Score: {}, Changed: {}", game.score(), result.changed);
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub mod board;
pub mod error;
pub mod scores;
pub mod storage;

pub use board::{Board, MAX_TILE, MIN_SIZE, WINNING_TILE};
pub use error::{GameError, GameResult};
pub use scores::{MemoryArchive, ScoreArchive, ScoreRecord};
#[cfg(feature = "sqlite")]
pub use scores::SqliteArchive;
pub use storage::{JsonFileStore, MemoryStore, SaveStore};

/// The four possible move directions in 2048.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions, in the order used by [`Game::legal_moves`].
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl FromStr for Direction {
    type Err = GameError;

    /// Accepts `up`/`down`/`left`/`right` and the `w`/`s`/`a`/`d` keys,
    /// ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "w" => Ok(Direction::Up),
            "down" | "s" => Ok(Direction::Down),
            "left" | "a" => Ok(Direction::Left),
            "right" | "d" => Ok(Direction::Right),
            _ => Err(GameError::InvalidDirection(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the game stands after the latest move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    /// A [`WINNING_TILE`] is on the board.
    Won,
    /// Board is full and no two neighbouring tiles are equal.
    Lost,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        self != GameStatus::InProgress
    }
}

/// A tile placed on the board after a successful move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawn {
    pub row: usize,
    pub col: usize,
    pub value: u32,
}

/// Result of executing a step (move) in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Whether the board changed (and a new tile was spawned).
    pub changed: bool,
    /// Points earned from merges in this move.
    pub reward: u64,
    /// The tile added after the move, if any.
    pub spawned: Option<Spawn>,
    /// Game status after the move and spawn.
    pub status: GameStatus,
}

/// Owned copy of a session's board and score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub board: Board,
    pub score: u64,
}

/// The 2048 game state.
///
/// The board and score are exclusively owned by the game; readers get a
/// shared borrow through [`Game::board`] or an owned [`Snapshot`].
#[derive(Clone)]
pub struct Game<R = SmallRng> {
    board: Board,
    score: u64,
    rng: R,
}

impl Game<SmallRng> {
    /// Create a new `size`×`size` game with the given seed.
    ///
    /// The game starts with two random tiles (90% chance of 2, 10% chance of 4).
    pub fn new(size: usize, seed: u64) -> GameResult<Self> {
        Self::with_rng(size, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Game<R> {
    /// Create a new game drawing spawns from `rng`.
    pub fn with_rng(size: usize, rng: R) -> GameResult<Self> {
        let mut game = Game {
            board: Board::new(size)?,
            score: 0,
            rng,
        };
        game.spawn_tile();
        game.spawn_tile();
        Ok(game)
    }

    /// Resume a saved session. No tiles are spawned.
    pub fn from_snapshot(snapshot: Snapshot, rng: R) -> Self {
        Game {
            board: snapshot.board,
            score: snapshot.score,
            rng,
        }
    }

    /// Start over on an empty board of the same size with two new tiles.
    pub fn reset(&mut self) {
        self.board.clear();
        self.score = 0;
        self.spawn_tile();
        self.spawn_tile();
        debug!("game reset on a {0}x{0} board", self.board.size());
    }

    /// Execute a move in the given direction.
    ///
    /// If the move doesn't change the board, no tile is spawned and the score
    /// is left alone. A game that already reached a terminal state refuses
    /// further moves.
    pub fn step(&mut self, direction: Direction) -> StepResult {
        let status = self.status();
        if status.is_terminal() {
            return StepResult {
                changed: false,
                reward: 0,
                spawned: None,
                status,
            };
        }

        let old_board = self.board.clone();
        let reward = self.board.slide(direction);

        let changed = self.board != old_board;
        let mut spawned = None;
        if changed {
            self.score += reward;
            spawned = self.spawn_tile();
        }
        debug!("move {} changed={} reward={}", direction, changed, reward);

        StepResult {
            changed,
            reward,
            spawned,
            status: self.status(),
        }
    }

    /// Current status: won, lost or still in progress.
    pub fn status(&self) -> GameStatus {
        if self.board.contains(WINNING_TILE) {
            GameStatus::Won
        } else if self.board.empty_count() == 0 && !self.board.has_adjacent_pair() {
            GameStatus::Lost
        } else {
            GameStatus::InProgress
        }
    }

    /// Check if the game is over, either by winning or by running out of moves.
    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// Get the legal moves as a boolean array [Up, Down, Left, Right].
    ///
    /// A move is legal if it would change the board.
    pub fn legal_moves(&self) -> [bool; 4] {
        Direction::ALL.map(|d| self.can_move(d))
    }

    /// Get a reference to the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Get the current score.
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Side length of the board.
    pub fn size(&self) -> usize {
        self.board.size()
    }

    /// Get the maximum tile value on the board.
    pub fn max_tile(&self) -> u32 {
        self.board.max_tile()
    }

    /// Get the number of empty cells on the board.
    pub fn empty_count(&self) -> usize {
        self.board.empty_count()
    }

    /// Owned copy of the board and score.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.clone(),
            score: self.score,
        }
    }

    /// Replace board and score with a previously taken snapshot.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.board = snapshot.board;
        self.score = snapshot.score;
    }

    /// Write the current board and score to `path` through `store`.
    pub fn save_to<S: SaveStore + ?Sized>(&self, store: &S, path: &Path) -> GameResult<()> {
        store.save(path, &self.snapshot())
    }

    /// Replace the session with the one saved at `path`.
    ///
    /// The game is only touched once the whole save has been read and
    /// validated; on error the current board and score stay as they were.
    pub fn load_from<S: SaveStore + ?Sized>(&mut self, store: &S, path: &Path) -> GameResult<()> {
        let snapshot = store.load(path)?;
        self.restore(snapshot);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Private methods
    // -------------------------------------------------------------------------

    /// Spawn a new tile in a random empty cell.
    /// 90% chance of 2, 10% chance of 4.
    fn spawn_tile(&mut self) -> Option<Spawn> {
        let empty_cells = self.board.empty_cells();
        if empty_cells.is_empty() {
            return None;
        }

        let idx = empty_cells[self.rng.gen_range(0..empty_cells.len())];
        let value = if self.rng.gen::<f32>() < 0.9 { 2 } else { 4 };
        self.board.set(idx, value);

        let spawn = Spawn {
            row: idx / self.board.size(),
            col: idx % self.board.size(),
            value,
        };
        debug!("spawned {} at [{}, {}]", spawn.value, spawn.row, spawn.col);
        Some(spawn)
    }

    /// Check if a move in the given direction would change the board.
    fn can_move(&self, direction: Direction) -> bool {
        let mut test_board = self.board.clone();
        test_board.slide(direction);
        test_board != self.board
    }
}

impl<R> fmt::Debug for Game<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("score", &self.score)
            .field("board", &self.board)
            .finish()
    }
}

impl<R> fmt::Display for Game<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Score: {}", self.score)?;
        write!(f, "{}", self.board)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn rows(rows: &[&[u32]]) -> Board {
        Board::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    /// Game over `board` whose spawns always pick the first empty cell and a 2.
    fn scripted(board: Board) -> Game<StepRng> {
        Game::from_snapshot(Snapshot { board, score: 0 }, StepRng::new(0, 0))
    }

    fn nonzero(board: &Board) -> usize {
        board.cells().iter().filter(|&&v| v != 0).count()
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    #[test]
    fn test_new_game_has_two_tiles() {
        for seed in 0..50 {
            let game = Game::new(4, seed).unwrap();
            assert_eq!(nonzero(game.board()), 2);
            assert_eq!(game.score(), 0);
            assert!(game.board().cells().iter().all(|&v| v == 0 || v == 2 || v == 4));
        }
    }

    #[test]
    fn test_new_game_rejects_degenerate_size() {
        assert!(matches!(Game::new(1, 0), Err(GameError::InvalidSize(1))));
        assert!(matches!(Game::new(0, 0), Err(GameError::InvalidSize(0))));
    }

    #[test]
    fn test_scripted_rng_fills_first_empty_cells() {
        let game = Game::with_rng(3, StepRng::new(0, 0)).unwrap();
        assert_eq!(game.board().cells(), &[2, 2, 0, 0, 0, 0, 0, 0, 0]);
    }

    // -------------------------------------------------------------------------
    // Spawn determinism tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_spawn_determinism() {
        let game1 = Game::new(4, 12345).unwrap();
        let game2 = Game::new(4, 12345).unwrap();
        assert_eq!(game1.board(), game2.board());
    }

    #[test]
    fn test_step_determinism() {
        let mut game1 = Game::new(4, 54321).unwrap();
        let mut game2 = Game::new(4, 54321).unwrap();

        for direction in [Direction::Left, Direction::Up, Direction::Right, Direction::Down] {
            assert_eq!(game1.step(direction), game2.step(direction));
            assert_eq!(game1.board(), game2.board());
            assert_eq!(game1.score(), game2.score());
        }
    }

    #[test]
    fn test_spawn_value_distribution() {
        let mut game = Game::with_rng(2, SmallRng::seed_from_u64(7)).unwrap();
        let mut fours = 0;
        let trials = 10_000;
        for _ in 0..trials {
            game.board.clear();
            if game.spawn_tile().map(|s| s.value) == Some(4) {
                fours += 1;
            }
        }
        let ratio = fours as f64 / trials as f64;
        assert!((0.07..0.13).contains(&ratio), "ratio of 4s was {}", ratio);
    }

    #[test]
    fn test_spawn_position_is_uniform() {
        let mut game = Game::with_rng(2, SmallRng::seed_from_u64(99)).unwrap();
        let mut hits = [0u32; 4];
        for _ in 0..8_000 {
            game.board.clear();
            let spawn = game.spawn_tile().unwrap();
            hits[spawn.row * 2 + spawn.col] += 1;
        }
        for count in hits {
            assert!((1_700..2_300).contains(&count), "hits {:?}", hits);
        }
    }

    #[test]
    fn test_spawn_on_full_board_is_noop() {
        let mut game = scripted(rows(&[&[2, 4], &[8, 16]]));
        assert_eq!(game.spawn_tile(), None);
        assert_eq!(game.board().cells(), &[2, 4, 8, 16]);
    }

    // -------------------------------------------------------------------------
    // Step semantics
    // -------------------------------------------------------------------------

    #[test]
    fn test_merge_scores_and_spawns_once() {
        let mut game = scripted(rows(&[
            &[2, 2, 0, 0],
            &[0, 0, 0, 0],
            &[0, 0, 0, 0],
            &[0, 0, 0, 0],
        ]));
        let result = game.step(Direction::Left);

        assert!(result.changed);
        assert_eq!(result.reward, 4);
        assert_eq!(game.score(), 4);
        assert_eq!(
            result.spawned,
            Some(Spawn {
                row: 0,
                col: 1,
                value: 2
            })
        );
        assert_eq!(&game.board().to_rows()[0], &[4, 2, 0, 0]);
        assert_eq!(nonzero(game.board()), 2);
    }

    #[test]
    fn test_full_row_merges_two_pairs() {
        let mut game = scripted(rows(&[
            &[2, 2, 2, 2],
            &[0, 0, 0, 0],
            &[0, 0, 0, 0],
            &[0, 0, 0, 0],
        ]));
        let result = game.step(Direction::Left);
        assert_eq!(result.reward, 8);
        assert_eq!(game.score(), 8);
        // first empty cell after the move is [0, 2]
        assert_eq!(&game.board().to_rows()[0], &[4, 4, 2, 0]);
    }

    #[test]
    fn test_step_no_change_no_spawn() {
        let mut game = scripted(rows(&[
            &[2, 0, 0, 0],
            &[4, 0, 0, 0],
            &[8, 0, 0, 0],
            &[16, 0, 0, 0],
        ]));
        let old_board = game.board().clone();
        let result = game.step(Direction::Left);

        assert!(!result.changed);
        assert_eq!(result.reward, 0);
        assert_eq!(result.spawned, None);
        assert_eq!(game.score(), 0);
        assert_eq!(game.board(), &old_board);
    }

    #[test]
    fn test_spawn_lands_on_previously_empty_cell() {
        let mut game = Game::new(4, 2024).unwrap();
        for i in 0..200 {
            let before = game.board().clone();
            let direction = Direction::ALL[i % 4];
            let result = game.step(direction);
            if let Some(spawn) = result.spawned {
                assert!(result.changed);
                let mut moved = before;
                moved.slide(direction);
                assert_eq!(moved.get(spawn.row, spawn.col), Some(0));
                assert!(spawn.value == 2 || spawn.value == 4);
            } else {
                assert!(!result.changed || game.empty_count() == 0);
            }
            if game.is_terminal() {
                break;
            }
        }
    }

    #[test]
    fn test_score_never_decreases() {
        let mut game = Game::new(4, 77).unwrap();
        let mut last = 0;
        for i in 0..500 {
            let result = game.step(Direction::ALL[(i * 7) % 4]);
            assert_eq!(game.score(), last + if result.changed { result.reward } else { 0 });
            last = game.score();
        }
    }

    #[test]
    fn test_tiles_stay_powers_of_two() {
        let mut game = Game::new(5, 3).unwrap();
        for i in 0..300 {
            game.step(Direction::ALL[i % 4]);
            assert!(game
                .board()
                .cells()
                .iter()
                .all(|&v| v == 0 || (v >= 2 && v.is_power_of_two())));
        }
    }

    // -------------------------------------------------------------------------
    // Terminal detection tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_game_not_over_with_empty_cells() {
        let game = Game::new(4, 42).unwrap();
        assert!(!game.is_terminal());
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_game_over_no_moves() {
        let game = scripted(rows(&[
            &[2, 4, 2, 4],
            &[4, 2, 4, 2],
            &[2, 4, 2, 4],
            &[4, 2, 4, 2],
        ]));
        assert!(game.is_terminal());
        assert_eq!(game.status(), GameStatus::Lost);
        assert_eq!(game.legal_moves(), [false, false, false, false]);
    }

    #[test]
    fn test_full_board_with_vertical_pair_is_live() {
        let game = scripted(rows(&[
            &[2, 4, 8, 16],
            &[2, 8, 16, 32],
            &[4, 16, 32, 64],
            &[8, 32, 64, 128],
        ]));
        assert!(!game.is_terminal());
        assert_eq!(game.legal_moves(), [true, true, false, false]);
    }

    #[test]
    fn test_full_board_with_horizontal_pair_is_live() {
        let game = scripted(rows(&[
            &[2, 2, 4, 8],
            &[4, 8, 16, 32],
            &[8, 16, 32, 64],
            &[16, 32, 64, 128],
        ]));
        assert!(!game.is_terminal());
    }

    #[test]
    fn test_winning_tile_is_terminal() {
        let game = scripted(rows(&[
            &[2048, 0, 0, 0],
            &[0, 0, 0, 0],
            &[0, 0, 0, 0],
            &[0, 0, 0, 2],
        ]));
        assert!(game.is_terminal());
        assert_eq!(game.status(), GameStatus::Won);
    }

    #[test]
    fn test_reaching_2048_ends_the_game() {
        let mut game = scripted(rows(&[&[1024, 1024], &[0, 0]]));
        let result = game.step(Direction::Left);
        assert!(result.changed);
        assert_eq!(result.reward, 2048);
        assert_eq!(result.status, GameStatus::Won);

        let after = game.step(Direction::Right);
        assert!(!after.changed);
        assert_eq!(after.status, GameStatus::Won);
        assert_eq!(game.score(), 2048);
    }

    // -------------------------------------------------------------------------
    // Reset, snapshots and persistence
    // -------------------------------------------------------------------------

    #[test]
    fn test_reset() {
        let mut game = Game::with_rng(4, StepRng::new(0, 0)).unwrap();
        game.step(Direction::Right);
        game.step(Direction::Down);
        assert_ne!(game.score(), 0);

        game.reset();
        assert_eq!(game.score(), 0);
        assert_eq!(game.size(), 4);
        assert_eq!(nonzero(game.board()), 2);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut game = Game::new(4, 5).unwrap();
        let snapshot = game.snapshot();
        game.step(Direction::Up);
        game.step(Direction::Left);
        game.step(Direction::Down);
        assert_eq!(snapshot.score, 0);
        assert_eq!(nonzero(&snapshot.board), 2);
    }

    #[test]
    fn test_save_and_load_through_store() {
        let store = MemoryStore::new();
        let path = Path::new("slot-1");
        let mut game = Game::new(4, 11).unwrap();
        game.step(Direction::Left);
        game.step(Direction::Up);
        game.save_to(&store, path).unwrap();
        let saved = game.snapshot();

        game.step(Direction::Right);
        game.step(Direction::Down);
        game.load_from(&store, path).unwrap();
        assert_eq!(game.snapshot(), saved);
    }

    #[test]
    fn test_failed_load_leaves_game_untouched() {
        let store = MemoryStore::new();
        let mut game = Game::new(4, 8).unwrap();
        let before = game.snapshot();
        let err = game.load_from(&store, Path::new("missing")).unwrap_err();
        assert!(matches!(err, GameError::Io(_)));
        assert_eq!(game.snapshot(), before);
    }

    // -------------------------------------------------------------------------
    // Direction parsing tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_direction_from_str() {
        assert_eq!("up".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!("DOWN".parse::<Direction>().unwrap(), Direction::Down);
        assert_eq!(" a ".parse::<Direction>().unwrap(), Direction::Left);
        assert_eq!("d".parse::<Direction>().unwrap(), Direction::Right);
        assert!(matches!(
            "sideways".parse::<Direction>(),
            Err(GameError::InvalidDirection(_))
        ));
        assert!("".parse::<Direction>().is_err());
    }

    #[test]
    fn test_direction_display_roundtrip() {
        for direction in Direction::ALL {
            assert_eq!(direction.to_string().parse::<Direction>().unwrap(), direction);
        }
    }

    // -------------------------------------------------------------------------
    // Display test
    // -------------------------------------------------------------------------

    #[test]
    fn test_display_format() {
        let game = Game::new(4, 42).unwrap();
        let display = format!("{}", game);
        assert!(display.contains("Score:"));
        assert!(display.contains("+------+"));
    }

    #[test]
    fn test_debug_format() {
        let game = Game::new(4, 42).unwrap();
        let debug = format!("{:?}", game);
        assert!(debug.contains("Game"));
        assert!(debug.contains("score"));
    }
}
