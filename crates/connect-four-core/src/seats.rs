//! Seat occupancy and the color assignment policy.
//!
//! A round has two seats, Red and Yellow. When a player joins, the color
//! they held in the previous round (if any) is honored when that seat is
//! free. The previous round is only ever seen through a [`Predecessor`]
//! snapshot, so a new round can never alter an old one.

use crate::board::Color;
use crate::round::GameError;
use serde::{Deserialize, Serialize};

/// Occupants of the two seats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seats<P> {
    pub red: Option<P>,
    pub yellow: Option<P>,
}

impl<P> Default for Seats<P> {
    fn default() -> Self {
        Self {
            red: None,
            yellow: None,
        }
    }
}

impl<P: Clone + PartialEq> Seats<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Who sits in a seat
    pub fn occupant(&self, color: Color) -> Option<&P> {
        match color {
            Color::Red => self.red.as_ref(),
            Color::Yellow => self.yellow.as_ref(),
        }
    }

    fn slot_mut(&mut self, color: Color) -> &mut Option<P> {
        match color {
            Color::Red => &mut self.red,
            Color::Yellow => &mut self.yellow,
        }
    }

    /// The seat a player holds, Red checked first
    pub fn color_of(&self, player: &P) -> Option<Color> {
        Color::ALL
            .into_iter()
            .find(|&color| self.occupant(color) == Some(player))
    }

    pub fn is_seated(&self, player: &P) -> bool {
        self.color_of(player).is_some()
    }

    pub fn is_free(&self, color: Color) -> bool {
        self.occupant(color).is_none()
    }

    /// Both seats taken by two different players.
    ///
    /// The same player holding both seats does not count as full.
    pub fn is_full(&self) -> bool {
        match (&self.red, &self.yellow) {
            (Some(red), Some(yellow)) => red != yellow,
            _ => false,
        }
    }

    /// The player across the table from `player`, if it is someone else
    pub fn opponent_of(&self, player: &P) -> Option<&P> {
        let color = self.color_of(player)?;
        self.occupant(color.opponent()).filter(|other| *other != player)
    }

    pub fn seat(&mut self, color: Color, player: P) {
        *self.slot_mut(color) = Some(player);
    }

    /// Empty every seat held by `player` and return the colors vacated
    pub fn vacate(&mut self, player: &P) -> Vec<Color> {
        let mut vacated = Vec::new();
        for color in Color::ALL {
            let slot = self.slot_mut(color);
            if slot.as_ref() == Some(player) {
                *slot = None;
                vacated.push(color);
            }
        }
        vacated
    }
}

/// Read-only record of the round that came before this one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predecessor<P> {
    pub seats: Seats<P>,
    pub first_mover: Color,
}

/// Pick a seat color for a joining player.
///
/// Rejects players already seated and rooms with two distinct occupants.
/// With a predecessor, a returning player gets their old color when it is
/// free and the other seat otherwise. Everyone else gets Red, then Yellow.
pub fn assign_seat<P: Clone + PartialEq>(
    seats: &Seats<P>,
    predecessor: Option<&Predecessor<P>>,
    player: &P,
) -> Result<Color, GameError> {
    if seats.is_seated(player) {
        return Err(GameError::AlreadyInGame);
    }
    if seats.is_full() {
        return Err(GameError::GameFull);
    }

    let preferred = predecessor
        .and_then(|prev| prev.seats.color_of(player))
        .unwrap_or(Color::Red);

    if seats.is_free(preferred) {
        Ok(preferred)
    } else if seats.is_free(preferred.opponent()) {
        Ok(preferred.opponent())
    } else {
        // Both seats hold the same player; only reachable from a
        // hand-built seat layout.
        Err(GameError::GameFull)
    }
}

/// The first mover for a round about to start.
///
/// If either seated player also sat in the predecessor, colors swap who
/// goes first. Otherwise Red opens.
pub fn first_mover_for<P: Clone + PartialEq>(
    seats: &Seats<P>,
    predecessor: Option<&Predecessor<P>>,
) -> Color {
    let Some(prev) = predecessor else {
        return Color::Red;
    };

    let carried_over = [&seats.red, &seats.yellow]
        .into_iter()
        .flatten()
        .any(|player| prev.seats.is_seated(player));

    if carried_over {
        prev.first_mover.opponent()
    } else {
        Color::Red
    }
}
