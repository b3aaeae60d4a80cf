//! Round state machine.
//!
//! A [`Round`] is one play of the game, from empty seats to a decided
//! board. It moves through `WaitingForPlayers -> WaitingToStart ->
//! InProgress -> Over`, and only falls back from `WaitingToStart` when a
//! seated player leaves before play begins.
//!
//! Every operation validates first and mutates second, so a rejected call
//! leaves the round exactly as it was.

use crate::actions::{Command, GameEvent};
use crate::board::{Board, Color, Move};
use crate::outcome::{self, Outcome};
use crate::seats::{self, Predecessor, Seats};
use crate::turn;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Lifecycle of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundStatus {
    /// Fewer than two players seated
    WaitingForPlayers,
    /// Both seats filled, waiting for both players to start
    WaitingToStart,
    /// Discs are being placed
    InProgress,
    /// Won, tied or forfeited
    Over,
}

/// Errors that can occur when applying commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Player is already in the game")]
    AlreadyInGame,

    #[error("Game is full")]
    GameFull,

    #[error("Player is not in the game")]
    PlayerNotInGame,

    #[error("Game cannot be started")]
    GameNotStartable,

    #[error("Not your turn")]
    MoveNotYourTurn,

    #[error("Board position is not valid")]
    BoardPositionNotValid,

    #[error("Game is not in progress")]
    GameNotInProgress,
}

/// Result of a successful [`Round::leave`]
#[derive(Debug, Clone)]
pub struct Departure<P> {
    pub events: Vec<GameEvent<P>>,
    /// Set when this call ended the round; install it as the next round
    pub successor: Option<Round<P>>,
}

/// Everything an observer sees about a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot<P> {
    pub status: RoundStatus,
    pub red: Option<P>,
    pub yellow: Option<P>,
    pub red_ready: bool,
    pub yellow_ready: bool,
    pub first_mover: Color,
    pub moves: Vec<Move>,
    pub winner: Option<P>,
}

/// One play of the game
#[derive(Debug, Clone)]
pub struct Round<P> {
    status: RoundStatus,
    seats: Seats<P>,
    red_ready: bool,
    yellow_ready: bool,
    first_mover: Color,
    winner: Option<P>,
    moves: Vec<Move>,
    /// Cache of `moves`, rebuilt after every accepted move
    board: Board,
    predecessor: Option<Predecessor<P>>,
}

impl<P: Clone + PartialEq + fmt::Debug> Default for Round<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Clone + PartialEq + fmt::Debug> Round<P> {
    /// Create a round with no history
    pub fn new() -> Self {
        Self {
            status: RoundStatus::WaitingForPlayers,
            seats: Seats::new(),
            red_ready: false,
            yellow_ready: false,
            first_mover: Color::Red,
            winner: None,
            moves: Vec::new(),
            board: Board::new(),
            predecessor: None,
        }
    }

    /// Create a round that follows an earlier one
    pub fn following(predecessor: Predecessor<P>) -> Self {
        Self {
            predecessor: Some(predecessor),
            ..Self::new()
        }
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn seats(&self) -> &Seats<P> {
        &self.seats
    }

    pub fn is_ready(&self, color: Color) -> bool {
        match color {
            Color::Red => self.red_ready,
            Color::Yellow => self.yellow_ready,
        }
    }

    fn set_ready(&mut self, color: Color, ready: bool) {
        match color {
            Color::Red => self.red_ready = ready,
            Color::Yellow => self.yellow_ready = ready,
        }
    }

    pub fn first_mover(&self) -> Color {
        self.first_mover
    }

    pub fn winner(&self) -> Option<&P> {
        self.winner.as_ref()
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn predecessor(&self) -> Option<&Predecessor<P>> {
        self.predecessor.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.status == RoundStatus::Over
    }

    /// Color to move next, while the round is in progress
    pub fn active_color(&self) -> Option<Color> {
        (self.status == RoundStatus::InProgress)
            .then(|| turn::active_color(self.first_mover, self.moves.len()))
    }

    /// Observer view of the round
    pub fn snapshot(&self) -> RoundSnapshot<P> {
        RoundSnapshot {
            status: self.status,
            red: self.seats.red.clone(),
            yellow: self.seats.yellow.clone(),
            red_ready: self.red_ready,
            yellow_ready: self.yellow_ready,
            first_mover: self.first_mover,
            moves: self.moves.clone(),
            winner: self.winner.clone(),
        }
    }

    /// A fresh, unseated round that remembers this one's seating.
    ///
    /// Only a finished round has a successor.
    pub fn successor(&self) -> Option<Round<P>> {
        if !self.is_over() {
            return None;
        }
        Some(Self::following(Predecessor {
            seats: self.seats.clone(),
            first_mover: self.first_mover,
        }))
    }

    /// Route a command to its operation.
    ///
    /// A successor produced by [`Command::Leave`] is dropped here; callers
    /// can get an equivalent one from [`Round::successor`].
    pub fn apply(&mut self, player: &P, command: Command) -> Result<Vec<GameEvent<P>>, GameError> {
        match command {
            Command::Join => self.join(player.clone()),
            Command::Start => self.start_game(player),
            Command::Move { column, row } => self.apply_move(player, column, row),
            Command::Leave => self.leave(player).map(|departure| departure.events),
        }
    }

    /// Seat a player
    pub fn join(&mut self, player: P) -> Result<Vec<GameEvent<P>>, GameError> {
        let color = seats::assign_seat(&self.seats, self.predecessor.as_ref(), &player)?;

        debug!(?player, %color, "player seated");
        self.seats.seat(color, player.clone());

        let mut events = vec![GameEvent::PlayerSeated { player, color }];

        if self.seats.is_full() && self.status == RoundStatus::WaitingForPlayers {
            self.status = RoundStatus::WaitingToStart;
            events.push(GameEvent::SeatsFilled);
        }

        Ok(events)
    }

    /// Mark a seated player ready; play begins once both are
    pub fn start_game(&mut self, player: &P) -> Result<Vec<GameEvent<P>>, GameError> {
        if self.status != RoundStatus::WaitingToStart {
            return Err(GameError::GameNotStartable);
        }
        let color = self.seats.color_of(player).ok_or(GameError::PlayerNotInGame)?;

        self.first_mover = seats::first_mover_for(&self.seats, self.predecessor.as_ref());

        let mut events = Vec::new();

        if !self.is_ready(color) {
            self.set_ready(color, true);
            events.push(GameEvent::PlayerReady {
                player: player.clone(),
                color,
            });
        }

        if self.red_ready && self.yellow_ready {
            debug!(first_mover = %self.first_mover, "round started");
            self.status = RoundStatus::InProgress;
            events.push(GameEvent::GameStarted {
                first_mover: self.first_mover,
            });
        }

        Ok(events)
    }

    /// Place a disc for `player` at `(column, row)`
    pub fn apply_move(
        &mut self,
        player: &P,
        column: usize,
        row: usize,
    ) -> Result<Vec<GameEvent<P>>, GameError> {
        if self.status != RoundStatus::InProgress {
            return Err(GameError::GameNotInProgress);
        }
        let color = turn::check_turn(&self.seats, self.first_mover, self.moves.len(), player)?;
        if !self.board.placeable(column, row) {
            return Err(GameError::BoardPositionNotValid);
        }

        let placed = Move::new(color, column, row);
        self.moves.push(placed);
        self.board = Board::from_moves(&self.moves);

        let mut events = vec![GameEvent::DiscPlaced {
            player: player.clone(),
            placed,
        }];

        match outcome::detect(&self.board, self.moves.len()) {
            Outcome::NoResult => {}
            Outcome::Win(color) => {
                self.status = RoundStatus::Over;
                self.winner = self.seats.occupant(color).cloned();
                debug!(%color, winner = ?self.winner, "round won");
                events.push(GameEvent::GameWon {
                    winner: self.winner.clone(),
                    color,
                });
            }
            Outcome::Tie => {
                self.status = RoundStatus::Over;
                debug!("round tied");
                events.push(GameEvent::GameTied);
            }
        }

        Ok(events)
    }

    /// Remove a player from the round.
    ///
    /// Leaving mid-game forfeits to the opponent. Leaving before play
    /// frees the seat. Leaving a finished round changes nothing.
    pub fn leave(&mut self, player: &P) -> Result<Departure<P>, GameError> {
        if !self.seats.is_seated(player) {
            return Err(GameError::PlayerNotInGame);
        }

        let mut events = Vec::new();
        let mut successor = None;

        match self.status {
            RoundStatus::InProgress => {
                self.status = RoundStatus::Over;
                self.winner = self.seats.opponent_of(player).cloned();
                debug!(?player, winner = ?self.winner, "player forfeited");
                events.push(GameEvent::Forfeited {
                    player: player.clone(),
                    winner: self.winner.clone(),
                });
                successor = self.successor();
            }
            RoundStatus::WaitingToStart | RoundStatus::WaitingForPlayers => {
                let vacated = self.seats.vacate(player);
                for &color in &vacated {
                    self.set_ready(color, false);
                }
                self.status = RoundStatus::WaitingForPlayers;
                debug!(?player, ?vacated, "player left before start");
                events.push(GameEvent::PlayerLeft {
                    player: player.clone(),
                    vacated,
                });
            }
            RoundStatus::Over => {}
        }

        Ok(Departure { events, successor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seated(a: &'static str, b: &'static str) -> Round<&'static str> {
        let mut round = Round::new();
        round.join(a).unwrap();
        round.join(b).unwrap();
        round
    }

    fn started(a: &'static str, b: &'static str) -> Round<&'static str> {
        let mut round = seated(a, b);
        round.start_game(&a).unwrap();
        round.start_game(&b).unwrap();
        round
    }

    #[test]
    fn test_new_round_waits_for_players() {
        let round: Round<&str> = Round::new();
        assert_eq!(round.status(), RoundStatus::WaitingForPlayers);
        assert!(round.moves().is_empty());
        assert_eq!(round.winner(), None);
        assert_eq!(round.successor().map(|r| r.status()), None);
    }

    #[test]
    fn test_join_fills_seats() {
        let mut round = Round::new();
        assert_eq!(
            round.join("p1").unwrap(),
            vec![GameEvent::PlayerSeated {
                player: "p1",
                color: Color::Red
            }]
        );
        assert_eq!(round.status(), RoundStatus::WaitingForPlayers);

        let events = round.join("p2").unwrap();
        assert_eq!(events.last(), Some(&GameEvent::SeatsFilled));
        assert_eq!(round.status(), RoundStatus::WaitingToStart);

        assert_eq!(round.join("p3"), Err(GameError::GameFull));
        assert_eq!(round.join("p1"), Err(GameError::AlreadyInGame));
    }

    #[test]
    fn test_start_requires_full_table() {
        let mut round = Round::new();
        round.join("p1").unwrap();
        assert_eq!(round.start_game(&"p1"), Err(GameError::GameNotStartable));
    }

    #[test]
    fn test_start_requires_seat() {
        let mut round = seated("p1", "p2");
        assert_eq!(round.start_game(&"p3"), Err(GameError::PlayerNotInGame));
    }

    #[test]
    fn test_start_is_idempotent_per_player() {
        let mut round = seated("p1", "p2");
        assert_eq!(round.start_game(&"p1").unwrap().len(), 1);
        assert!(round.start_game(&"p1").unwrap().is_empty());
        assert!(round.is_ready(Color::Red));
        assert!(!round.is_ready(Color::Yellow));
        assert_eq!(round.status(), RoundStatus::WaitingToStart);

        let events = round.start_game(&"p2").unwrap();
        assert_eq!(
            events.last(),
            Some(&GameEvent::GameStarted {
                first_mover: Color::Red
            })
        );
        assert_eq!(round.status(), RoundStatus::InProgress);
        assert_eq!(round.start_game(&"p1"), Err(GameError::GameNotStartable));
    }

    #[test]
    fn test_move_validation_order() {
        let mut round = seated("p1", "p2");
        assert_eq!(round.apply_move(&"p1", 0, 5), Err(GameError::GameNotInProgress));

        let mut round = started("p1", "p2");
        assert_eq!(round.apply_move(&"p3", 0, 5), Err(GameError::PlayerNotInGame));
        assert_eq!(round.apply_move(&"p2", 0, 5), Err(GameError::MoveNotYourTurn));
        assert_eq!(round.apply_move(&"p1", 0, 4), Err(GameError::BoardPositionNotValid));
        assert_eq!(round.apply_move(&"p1", 7, 5), Err(GameError::BoardPositionNotValid));
        assert!(round.moves().is_empty());

        round.apply_move(&"p1", 0, 5).unwrap();
        assert_eq!(round.moves(), &[Move::new(Color::Red, 0, 5)]);
        assert_eq!(round.active_color(), Some(Color::Yellow));
    }

    #[test]
    fn test_rejected_move_leaves_round_unchanged() {
        let mut round = started("p1", "p2");
        round.apply_move(&"p1", 3, 5).unwrap();
        let before = round.snapshot();

        assert_eq!(round.apply_move(&"p2", 3, 5), Err(GameError::BoardPositionNotValid));
        assert_eq!(round.snapshot(), before);
    }

    #[test]
    fn test_leave_in_progress_forfeits() {
        let mut round = started("p1", "p2");
        let departure = round.leave(&"p2").unwrap();

        assert_eq!(round.status(), RoundStatus::Over);
        assert_eq!(round.winner(), Some(&"p1"));
        assert_eq!(
            departure.events,
            vec![GameEvent::Forfeited {
                player: "p2",
                winner: Some("p1")
            }]
        );

        let next = departure.successor.expect("forfeit prepares a successor");
        assert_eq!(next.status(), RoundStatus::WaitingForPlayers);
        assert_eq!(next.seats(), &Seats::new());
        assert_eq!(
            next.predecessor().map(|p| p.seats.red),
            Some(Some("p1"))
        );
    }

    #[test]
    fn test_leave_waiting_to_start_regresses() {
        let mut round = seated("p1", "p2");
        round.start_game(&"p1").unwrap();

        let departure = round.leave(&"p1").unwrap();
        assert!(departure.successor.is_none());
        assert_eq!(round.status(), RoundStatus::WaitingForPlayers);
        assert_eq!(round.seats().red, None);
        assert!(!round.is_ready(Color::Red));

        round.join("p3").unwrap();
        assert_eq!(round.seats().red, Some("p3"));
        assert_eq!(round.status(), RoundStatus::WaitingToStart);
    }

    #[test]
    fn test_leave_waiting_for_players() {
        let mut round = Round::new();
        round.join("p1").unwrap();
        round.leave(&"p1").unwrap();
        assert_eq!(round.status(), RoundStatus::WaitingForPlayers);
        assert_eq!(round.seats(), &Seats::new());
        assert_eq!(round.leave(&"p1").map(|d| d.events), Err(GameError::PlayerNotInGame));
    }

    #[test]
    fn test_leave_finished_round_is_noop() {
        let mut round = started("p1", "p2");
        round.leave(&"p1").unwrap();
        let before = round.snapshot();

        let departure = round.leave(&"p2").unwrap();
        assert!(departure.events.is_empty());
        assert!(departure.successor.is_none());
        assert_eq!(round.snapshot(), before);
    }

    #[test]
    fn test_apply_routes_commands() {
        let mut round = Round::new();
        round.apply(&"p1", Command::Join).unwrap();
        round.apply(&"p2", Command::Join).unwrap();
        round.apply(&"p1", Command::Start).unwrap();
        round.apply(&"p2", Command::Start).unwrap();
        round
            .apply(&"p1", Command::Move { column: 2, row: 5 })
            .unwrap();
        round.apply(&"p2", Command::Leave).unwrap();

        assert_eq!(round.winner(), Some(&"p1"));
    }

    #[test]
    fn test_snapshot() {
        let mut round = started("p1", "p2");
        round.apply_move(&"p1", 3, 5).unwrap();

        assert_eq!(
            round.snapshot(),
            RoundSnapshot {
                status: RoundStatus::InProgress,
                red: Some("p1"),
                yellow: Some("p2"),
                red_ready: true,
                yellow_ready: true,
                first_mover: Color::Red,
                moves: vec![Move::new(Color::Red, 3, 5)],
                winner: None,
            }
        );
    }
}
