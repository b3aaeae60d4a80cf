//! Win and tie detection.
//!
//! Runs after every accepted move. Checks are made in a fixed order:
//! horizontal, vertical, the `\` diagonal, the `/` diagonal, and finally a
//! full board. A win always takes precedence over a tie, because the
//! winning disc may itself be the one that fills the board.

use crate::board::{Board, Cell, Color, CAPACITY, COLS, ROWS};
use serde::{Deserialize, Serialize};

/// Discs in a row needed to win
pub const CONNECT: usize = 4;

/// Result of inspecting a board after a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    NoResult,
    Win(Color),
    Tie,
}

/// Direction of a line scan as (column step, row step)
const HORIZONTAL: (isize, isize) = (1, 0);
const VERTICAL: (isize, isize) = (0, 1);
/// Top-left to bottom-right
const DIAGONAL_DOWN: (isize, isize) = (1, 1);
/// Bottom-left to top-right
const DIAGONAL_UP: (isize, isize) = (1, -1);

/// Inspect the board. `move_count` is the length of the move log.
pub fn detect(board: &Board, move_count: usize) -> Outcome {
    for direction in [HORIZONTAL, VERTICAL, DIAGONAL_DOWN, DIAGONAL_UP] {
        if let Some(color) = find_run(board, direction) {
            return Outcome::Win(color);
        }
    }

    if move_count >= CAPACITY {
        return Outcome::Tie;
    }

    Outcome::NoResult
}

/// Find any run of [`CONNECT`] same-colored discs along a direction
fn find_run(board: &Board, (dc, dr): (isize, isize)) -> Option<Color> {
    for row in 0..ROWS {
        for column in 0..COLS {
            let color = match board.get(column, row) {
                Cell::Disc(color) => color,
                Cell::Empty => continue,
            };

            let run = (1..CONNECT).all(|step| {
                let c = column as isize + dc * step as isize;
                let r = row as isize + dr * step as isize;
                in_bounds(c, r) && board.get(c as usize, r as usize) == Cell::Disc(color)
            });

            if run {
                return Some(color);
            }
        }
    }
    None
}

fn in_bounds(column: isize, row: isize) -> bool {
    (0..COLS as isize).contains(&column) && (0..ROWS as isize).contains(&row)
}
