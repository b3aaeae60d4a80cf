//! Commands a player can send to a round and the events they produce.

use crate::board::{Color, Move};
use serde::{Deserialize, Serialize};

/// Everything a player can ask a round to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Take a seat
    Join,
    /// Mark yourself ready to play
    Start,
    /// Place a disc at a cell
    Move { column: usize, row: usize },
    /// Leave the round
    Leave,
}

/// Events that occur as a result of commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent<P> {
    /// A player took a seat
    PlayerSeated { player: P, color: Color },

    /// Both seats are now filled
    SeatsFilled,

    /// A seated player is ready to start
    PlayerReady { player: P, color: Color },

    /// Both players are ready and the first disc can be placed
    GameStarted { first_mover: Color },

    /// A disc was placed
    DiscPlaced { player: P, placed: Move },

    /// Four in a row
    GameWon { winner: Option<P>, color: Color },

    /// The board filled with no winner
    GameTied,

    /// A player gave up their seat before play began
    PlayerLeft { player: P, vacated: Vec<Color> },

    /// A player left mid-game and the round was decided
    Forfeited { player: P, winner: Option<P> },
}
