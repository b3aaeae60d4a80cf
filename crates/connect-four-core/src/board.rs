//! Board representation for a Connect Four round.
//!
//! This module contains:
//! - Disc colors and cell values
//! - The 6x7 grid and its gravity-aware placement checks
//! - The move record that makes up a round's log
//!
//! The board is never authoritative on its own. A round rebuilds it from
//! the move log with [`Board::from_moves`] after every accepted move.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of rows on the board (row 0 is the top, row 5 the floor)
pub const ROWS: usize = 6;

/// Number of columns on the board
pub const COLS: usize = 7;

/// Number of cells, and therefore the longest possible move log
pub const CAPACITY: usize = ROWS * COLS;

/// Seat / disc color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Yellow,
}

impl Color {
    /// Both colors, Red first
    pub const ALL: [Color; 2] = [Color::Red, Color::Yellow];

    /// The other seat's color
    pub fn opponent(self) -> Self {
        match self {
            Color::Red => Color::Yellow,
            Color::Yellow => Color::Red,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "Red"),
            Color::Yellow => write!(f, "Yellow"),
        }
    }
}

/// Contents of a single board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Disc(Color),
}

impl Cell {
    pub fn color(self) -> Option<Color> {
        match self {
            Cell::Empty => None,
            Cell::Disc(color) => Some(color),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

/// A disc that has been placed, as recorded in the move log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub color: Color,
    pub column: usize,
    pub row: usize,
}

impl Move {
    pub fn new(color: Color, column: usize, row: usize) -> Self {
        Self { color, column, row }
    }
}

/// The 6x7 grid
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a board by replaying a move log onto an empty grid.
    ///
    /// Moves are written as recorded; the log is assumed to have been
    /// validated with [`Board::placeable`] when each entry was accepted.
    pub fn from_moves(moves: &[Move]) -> Self {
        let mut board = Self::new();
        for mv in moves {
            board.cells[mv.row][mv.column] = Cell::Disc(mv.color);
        }
        board
    }

    /// Get a cell. Out-of-range coordinates read as empty.
    pub fn get(&self, column: usize, row: usize) -> Cell {
        if column >= COLS || row >= ROWS {
            return Cell::Empty;
        }
        self.cells[row][column]
    }

    /// Whether a disc could rest at `(column, row)`: the cell is on the
    /// board, empty, and sits on the floor or on top of another disc.
    pub fn placeable(&self, column: usize, row: usize) -> bool {
        if column >= COLS || row >= ROWS {
            return false;
        }
        if !self.cells[row][column].is_empty() {
            return false;
        }
        row == ROWS - 1 || !self.cells[row + 1][column].is_empty()
    }

    /// Put a disc on a cell. Callers must check [`Board::placeable`] first.
    pub fn set(&mut self, column: usize, row: usize, color: Color) {
        debug_assert!(self.placeable(column, row), "cell ({column}, {row}) is not placeable");
        self.cells[row][column] = Cell::Disc(color);
    }

    /// The row a disc dropped into `column` would land on, if any
    pub fn landing_row(&self, column: usize) -> Option<usize> {
        if column >= COLS {
            return None;
        }
        (0..ROWS).rev().find(|&row| self.cells[row][column].is_empty())
    }

    /// Iterate over the rows, top first
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; COLS]> {
        self.cells.iter()
    }

    /// Number of discs on the board
    pub fn disc_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| !cell.is_empty())
            .count()
    }

    /// Check that no disc is floating above an empty cell
    pub fn satisfies_gravity(&self) -> bool {
        (0..COLS).all(|column| {
            (0..ROWS - 1).all(|row| {
                self.cells[row][column].is_empty() || !self.cells[row + 1][column].is_empty()
            })
        })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for cell in row {
                let c = match cell {
                    Cell::Empty => '.',
                    Cell::Disc(Color::Red) => 'R',
                    Cell::Disc(Color::Yellow) => 'Y',
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_only_floor_is_placeable() {
        let board = Board::new();
        for column in 0..COLS {
            assert!(board.placeable(column, ROWS - 1));
            for row in 0..ROWS - 1 {
                assert!(!board.placeable(column, row));
            }
        }
    }

    #[test]
    fn test_out_of_range_not_placeable() {
        let board = Board::new();
        assert!(!board.placeable(COLS, ROWS - 1));
        assert!(!board.placeable(0, ROWS));
    }

    #[test]
    fn test_stacking() {
        let mut board = Board::new();
        board.set(3, 5, Color::Red);

        // Occupied cell and floating cells are rejected
        assert!(!board.placeable(3, 5));
        assert!(!board.placeable(3, 3));
        assert!(board.placeable(3, 4));
        assert_eq!(board.landing_row(3), Some(4));
    }

    #[test]
    fn test_full_column_has_no_landing_row() {
        let mut board = Board::new();
        for row in (0..ROWS).rev() {
            board.set(0, row, if row % 2 == 0 { Color::Red } else { Color::Yellow });
        }
        assert_eq!(board.landing_row(0), None);
        assert!((0..ROWS).all(|row| !board.placeable(0, row)));
    }

    #[test]
    fn test_from_moves_matches_incremental() {
        let moves = [
            Move::new(Color::Red, 3, 5),
            Move::new(Color::Yellow, 3, 4),
            Move::new(Color::Red, 4, 5),
        ];

        let mut board = Board::new();
        for mv in &moves {
            assert!(board.placeable(mv.column, mv.row));
            board.set(mv.column, mv.row, mv.color);
        }

        assert_eq!(Board::from_moves(&moves), board);
        assert_eq!(board.disc_count(), 3);
        assert!(board.satisfies_gravity());
    }

    #[test]
    fn test_display() {
        let board = Board::from_moves(&[Move::new(Color::Red, 0, 5), Move::new(Color::Yellow, 1, 5)]);
        let text = board.to_string();
        assert_eq!(text.lines().last(), Some("RY....."));
    }

    #[test]
    fn test_color_opponent() {
        assert_eq!(Color::Red.opponent(), Color::Yellow);
        assert_eq!(Color::Yellow.opponent(), Color::Red);
    }
}
