//! Connect Four - a two-seat game room engine
//!
//! This crate provides the rules of a Connect Four room that hosts one
//! round after another:
//! - The 6x7 board with gravity-aware placement
//! - Win and tie detection
//! - Seat assignment that carries each player's color into the next round
//! - Turn order derived from the move count
//! - The round state machine tying these together
//!
//! # Architecture
//!
//! The engine does no I/O. A dispatcher (see the server crate) routes
//! player commands to the active [`Round`], broadcasts
//! [`RoundSnapshot`]s, and installs the successor round when one ends.
//! It can also be compiled to WebAssembly for local play.
//!
//! # Modules
//!
//! - [`board`]: Grid, colors and the move record
//! - [`outcome`]: Four-in-a-row and full-board detection
//! - [`seats`]: Seat occupancy and color assignment
//! - [`turn`]: Whose turn it is
//! - [`round`]: Round state machine
//! - [`actions`]: Commands and resulting events

pub mod actions;
pub mod board;
pub mod outcome;
pub mod round;
pub mod seats;
pub mod turn;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{Command, GameEvent};
pub use board::{Board, Cell, Color, Move, CAPACITY, COLS, ROWS};
pub use outcome::Outcome;
pub use round::{Departure, GameError, Round, RoundSnapshot, RoundStatus};
pub use seats::{Predecessor, Seats};
