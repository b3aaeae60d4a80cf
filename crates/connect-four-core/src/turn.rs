//! Turn order.
//!
//! Whose turn it is comes from the move count and the round's first
//! mover alone; nothing stores a "current player".

use crate::board::Color;
use crate::round::GameError;
use crate::seats::Seats;

/// Color to move when `move_count` discs have been placed
pub fn active_color(first_mover: Color, move_count: usize) -> Color {
    if move_count % 2 == 0 {
        first_mover
    } else {
        first_mover.opponent()
    }
}

/// Check that `player` may place the next disc, returning its color.
pub fn check_turn<P: Clone + PartialEq>(
    seats: &Seats<P>,
    first_mover: Color,
    move_count: usize,
    player: &P,
) -> Result<Color, GameError> {
    if !seats.is_seated(player) {
        return Err(GameError::PlayerNotInGame);
    }

    let active = active_color(first_mover, move_count);
    if seats.occupant(active) != Some(player) {
        return Err(GameError::MoveNotYourTurn);
    }

    Ok(active)
}
