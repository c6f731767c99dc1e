//! Square tile grid and the slide/merge transformation.
//!
//! Cells are stored as a flat row-major vector: index `row * size + col`.
//! Empty cells are 0, tiles hold their face value (2, 4, 8, ...).

use std::fmt;

use crate::error::{GameError, GameResult};
use crate::Direction;

/// Tile value that ends the game as a win.
pub const WINNING_TILE: u32 = 2048;

/// Smallest playable board side.
pub const MIN_SIZE: usize = 2;

/// Largest tile a `u32` cell can hold. Two of them never merge.
pub const MAX_TILE: u32 = 1 << 31;

/// An N×N grid of tiles.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    cells: Vec<u32>,
}

impl Board {
    /// Create an empty `size`×`size` board.
    pub fn new(size: usize) -> GameResult<Self> {
        if size < MIN_SIZE {
            return Err(GameError::InvalidSize(size));
        }
        Ok(Board {
            size,
            cells: vec![0; size * size],
        })
    }

    /// Build a board from explicit rows, checking shape and tile values.
    pub fn from_rows(rows: Vec<Vec<u32>>) -> GameResult<Self> {
        let size = rows.len();
        if size < MIN_SIZE {
            return Err(GameError::InvalidSize(size));
        }

        let mut cells = Vec::with_capacity(size * size);
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(GameError::InvalidBoard(format!(
                    "row {} has {} cells, expected {}",
                    r,
                    row.len(),
                    size
                )));
            }
            for (c, &value) in row.iter().enumerate() {
                if !is_tile_value(value) {
                    return Err(GameError::InvalidBoard(format!(
                        "cell [{}, {}] holds {}, not a power of two",
                        r, c, value
                    )));
                }
            }
            cells.extend(row);
        }

        Ok(Board { size, cells })
    }

    /// Side length of the board.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Value at `(row, col)`, or `None` when out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        if row < self.size && col < self.size {
            Some(self.cells[row * self.size + col])
        } else {
            None
        }
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    /// Iterate over the rows of the board.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> + '_ {
        self.cells.chunks(self.size)
    }

    /// Owned copy of the grid as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.rows().map(<[u32]>::to_vec).collect()
    }

    /// Flat indices of every empty cell, in row-major order.
    pub fn empty_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == 0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of empty cells.
    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    /// Highest tile on the board, 0 when empty.
    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Whether any cell holds `value`.
    pub fn contains(&self, value: u32) -> bool {
        self.cells.contains(&value)
    }

    /// Whether two horizontally or vertically neighbouring tiles are equal
    /// and could still merge.
    pub fn has_adjacent_pair(&self) -> bool {
        let n = self.size;
        for row in 0..n {
            for col in 0..n {
                let value = self.cells[row * n + col];
                if !is_mergeable(value) {
                    continue;
                }
                if col + 1 < n && self.cells[row * n + col + 1] == value {
                    return true;
                }
                if row + 1 < n && self.cells[(row + 1) * n + col] == value {
                    return true;
                }
            }
        }
        false
    }

    pub(crate) fn set(&mut self, index: usize, value: u32) {
        self.cells[index] = value;
    }

    pub(crate) fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Slide every line towards `direction`, merging equal neighbours.
    ///
    /// Each line is walked starting at the edge tiles travel towards. A
    /// compaction cursor `target` marks the next free slot; a tile either
    /// merges into the slot just behind the cursor (once per slot per move)
    /// or is moved onto the cursor. [`MAX_TILE`] tiles only move. Returns the
    /// sum of all merged tile values.
    pub fn slide(&mut self, direction: Direction) -> u64 {
        let mut reward = 0;
        let mut merged = vec![false; self.size];

        for line in 0..self.size {
            let indices = self.line_indices(direction, line);
            merged.fill(false);
            let mut target = 0;

            for pos in 0..indices.len() {
                let value = self.cells[indices[pos]];
                if value == 0 {
                    continue;
                }

                if target > 0
                    && !merged[target - 1]
                    && is_mergeable(value)
                    && self.cells[indices[target - 1]] == value
                {
                    let dest = indices[target - 1];
                    self.cells[dest] = value * 2;
                    reward += u64::from(value * 2);
                    self.cells[indices[pos]] = 0;
                    merged[target - 1] = true;
                } else {
                    if target != pos {
                        self.cells[indices[target]] = value;
                        self.cells[indices[pos]] = 0;
                    }
                    target += 1;
                }
            }
        }

        reward
    }

    /// Flat indices of one row or column, ordered from the edge that tiles
    /// move towards.
    fn line_indices(&self, direction: Direction, line: usize) -> Vec<usize> {
        let n = self.size;
        (0..n)
            .map(|k| {
                let (row, col) = match direction {
                    Direction::Left => (line, k),
                    Direction::Right => (line, n - 1 - k),
                    Direction::Up => (k, line),
                    Direction::Down => (n - 1 - k, line),
                };
                row * n + col
            })
            .collect()
    }
}

/// 0 (empty) or a power of two no smaller than 2.
fn is_tile_value(value: u32) -> bool {
    value == 0 || (value >= 2 && value.is_power_of_two())
}

fn is_mergeable(value: u32) -> bool {
    value != 0 && value < MAX_TILE
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rows()).finish()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.max_tile().to_string().len().max(4) + 2;
        let border = format!("+{}", format!("{}+", "-".repeat(width)).repeat(self.size));

        writeln!(f, "{}", border)?;
        for row in self.rows() {
            write!(f, "|")?;
            for &val in row {
                if val == 0 {
                    write!(f, "{:^width$}|", "-", width = width)?;
                } else {
                    write!(f, "{:^width$}|", val, width = width)?;
                }
            }
            writeln!(f)?;
            writeln!(f, "{}", border)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
