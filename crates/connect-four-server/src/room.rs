//! Game room management.
//!
//! A room hosts one round at a time. When the active round ends, its
//! outcome goes into the room's history and the round's successor is
//! installed under a new round ID, so players keep their colors when they
//! sit down again.

use connect_four_core::{Command, GameError, GameEvent, Round, RoundSnapshot, RoundStatus};
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::protocol::{PlayerInfo, RoomInfo, RoundRecord};

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Player not in room")]
    PlayerNotInRoom,

    #[error("Round {0} is no longer active")]
    StaleRound(Uuid),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// A player in a game room.
#[derive(Debug, Clone)]
pub struct RoomPlayer {
    pub id: Uuid,
    pub name: String,
}

impl RoomPlayer {
    pub fn new(id: Uuid, name: String) -> Self {
        Self { id, name }
    }
}

/// What a successful command did to the room
#[derive(Debug, Clone)]
pub struct Dispatch {
    /// Round the command was applied to
    pub round_id: Uuid,
    pub events: Vec<GameEvent<Uuid>>,
    /// State of that round after the command
    pub state: RoundSnapshot<Uuid>,
    /// Set when the command ended the round
    pub finished: Option<RoundRecord>,
}

/// A game room with a sequence of rounds
pub struct GameRoom {
    pub id: Uuid,
    pub name: String,
    pub players: HashMap<Uuid, RoomPlayer>,
    /// Arrival order, for stable listings
    pub player_order: Vec<Uuid>,
    pub round_id: Uuid,
    pub round: Round<Uuid>,
    /// Finished rounds, oldest first
    pub history: Vec<RoundRecord>,
}

impl GameRoom {
    pub fn new(id: Uuid, host_name: &str) -> Self {
        Self {
            id,
            name: format!("{}'s Room", host_name),
            players: HashMap::new(),
            player_order: Vec::new(),
            round_id: Uuid::new_v4(),
            round: Round::new(),
            history: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        !self.round.seats().is_full()
    }

    /// Enter the room and take a seat in the active round.
    ///
    /// The player is only added to the room if seating succeeds.
    pub fn add_player(&mut self, player_id: Uuid, name: String) -> Result<Dispatch, RoomError> {
        let round_id = self.round_id;
        let dispatch = self.dispatch(player_id, round_id, Command::Join)?;

        if !self.players.contains_key(&player_id) {
            self.players.insert(player_id, RoomPlayer::new(player_id, name));
            self.player_order.push(player_id);
        }
        Ok(dispatch)
    }

    /// Leave the room, giving up any seat in the active round.
    ///
    /// Returns the dispatch if a seat was given up, and whether the room
    /// is now empty.
    pub fn remove_player(&mut self, player_id: Uuid) -> Result<(Option<Dispatch>, bool), RoomError> {
        if !self.players.contains_key(&player_id) {
            return Err(RoomError::PlayerNotInRoom);
        }

        let dispatch = if self.round.seats().is_seated(&player_id) {
            let round_id = self.round_id;
            Some(self.dispatch(player_id, round_id, Command::Leave)?)
        } else {
            None
        };

        self.players.remove(&player_id);
        self.player_order.retain(|&id| id != player_id);

        Ok((dispatch, self.players.is_empty()))
    }

    /// Apply a command from a room member to the round it names
    pub fn apply(
        &mut self,
        player_id: Uuid,
        round_id: Uuid,
        command: Command,
    ) -> Result<Dispatch, RoomError> {
        if !self.players.contains_key(&player_id) {
            return Err(RoomError::PlayerNotInRoom);
        }
        self.dispatch(player_id, round_id, command)
    }

    fn dispatch(
        &mut self,
        player_id: Uuid,
        round_id: Uuid,
        command: Command,
    ) -> Result<Dispatch, RoomError> {
        if round_id != self.round_id {
            return Err(RoomError::StaleRound(round_id));
        }

        let (events, successor) = match command {
            Command::Leave => {
                let departure = self.round.leave(&player_id)?;
                (departure.events, departure.successor)
            }
            command => {
                let events = self.round.apply(&player_id, command)?;
                (events, self.round.successor())
            }
        };

        let state = self.round.snapshot();
        let finished = successor.map(|next| self.install(next));

        Ok(Dispatch {
            round_id,
            events,
            state,
            finished,
        })
    }

    /// Record the finished round and make `next` the active one
    fn install(&mut self, next: Round<Uuid>) -> RoundRecord {
        let seats = self.round.seats();
        let record = RoundRecord {
            round_id: self.round_id,
            red: seats.red,
            yellow: seats.yellow,
            winner: self.round.winner().copied(),
            moves: self.round.moves().len(),
        };

        info!(
            room = %self.id,
            round = %self.round_id,
            winner = ?record.winner,
            "round finished"
        );

        self.history.push(record.clone());
        self.round = next;
        self.round_id = Uuid::new_v4();
        record
    }

    pub fn to_info(&self) -> RoomInfo {
        let seats = self.round.seats();
        RoomInfo {
            id: self.id,
            name: self.name.clone(),
            players: self
                .player_order
                .iter()
                .filter_map(|id| self.players.get(id))
                .map(|p| {
                    let color = seats.color_of(&p.id);
                    PlayerInfo {
                        id: p.id,
                        name: p.name.clone(),
                        color,
                        ready: color.is_some_and(|c| self.round.is_ready(c)),
                    }
                })
                .collect(),
            round_id: self.round_id,
            status: self.round.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connect_four_core::Color;
    use pretty_assertions::assert_eq;

    fn room_with_two() -> (GameRoom, Uuid, Uuid) {
        let mut room = GameRoom::new(Uuid::new_v4(), "Host");
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        room.add_player(p1, "One".to_string()).unwrap();
        room.add_player(p2, "Two".to_string()).unwrap();
        (room, p1, p2)
    }

    fn start(room: &mut GameRoom, p1: Uuid, p2: Uuid) {
        let round_id = room.round_id;
        room.apply(p1, round_id, Command::Start).unwrap();
        room.apply(p2, round_id, Command::Start).unwrap();
    }

    #[test]
    fn test_create_room() {
        let room = GameRoom::new(Uuid::new_v4(), "Host");
        assert_eq!(room.players.len(), 0);
        assert!(room.is_open());
        assert_eq!(room.round.status(), RoundStatus::WaitingForPlayers);
    }

    #[test]
    fn test_add_players() {
        let (mut room, p1, _) = room_with_two();
        assert_eq!(room.players.len(), 2);
        assert!(!room.is_open());
        assert_eq!(room.round.status(), RoundStatus::WaitingToStart);
        assert_eq!(room.to_info().players[0].color, Some(Color::Red));
        assert_eq!(room.to_info().players[0].id, p1);

        // A third player is turned away and not added
        let p3 = Uuid::new_v4();
        assert!(matches!(
            room.add_player(p3, "Three".to_string()),
            Err(RoomError::Game(GameError::GameFull))
        ));
        assert_eq!(room.players.len(), 2);
    }

    #[test]
    fn test_stale_round_rejected() {
        let (mut room, p1, _) = room_with_two();
        let stale = Uuid::new_v4();
        assert!(matches!(
            room.apply(p1, stale, Command::Start),
            Err(RoomError::StaleRound(id)) if id == stale
        ));
    }

    #[test]
    fn test_non_member_rejected() {
        let (mut room, _, _) = room_with_two();
        let round_id = room.round_id;
        assert!(matches!(
            room.apply(Uuid::new_v4(), round_id, Command::Start),
            Err(RoomError::PlayerNotInRoom)
        ));
    }

    #[test]
    fn test_win_installs_successor() {
        let (mut room, p1, p2) = room_with_two();
        start(&mut room, p1, p2);
        let first_round = room.round_id;

        for column in 0..3 {
            room.apply(p1, first_round, Command::Move { column, row: 5 }).unwrap();
            room.apply(p2, first_round, Command::Move { column, row: 4 }).unwrap();
        }
        let dispatch = room
            .apply(p1, first_round, Command::Move { column: 3, row: 5 })
            .unwrap();

        assert_eq!(dispatch.state.status, RoundStatus::Over);
        let record = dispatch.finished.expect("winning move ends the round");
        assert_eq!(record.winner, Some(p1));
        assert_eq!(record.moves, 7);
        assert_eq!(room.history, vec![record]);

        assert_ne!(room.round_id, first_round);
        assert_eq!(room.round.status(), RoundStatus::WaitingForPlayers);
        assert!(matches!(
            room.apply(p2, first_round, Command::Join),
            Err(RoomError::StaleRound(_))
        ));

        // Both rejoin the new round in reverse order and keep their colors
        let next = room.round_id;
        room.apply(p2, next, Command::Join).unwrap();
        room.apply(p1, next, Command::Join).unwrap();
        assert_eq!(room.round.seats().red, Some(p1));
        assert_eq!(room.round.seats().yellow, Some(p2));
    }

    #[test]
    fn test_leaving_room_mid_game_forfeits() {
        let (mut room, p1, p2) = room_with_two();
        start(&mut room, p1, p2);

        let (dispatch, empty) = room.remove_player(p1).unwrap();
        assert!(!empty);

        let record = dispatch.and_then(|d| d.finished).expect("forfeit ends the round");
        assert_eq!(record.winner, Some(p2));
        assert_eq!(room.history.len(), 1);
        assert_eq!(room.round.status(), RoundStatus::WaitingForPlayers);
    }

    #[test]
    fn test_leaving_before_start_frees_seat() {
        let (mut room, p1, _) = room_with_two();

        let (dispatch, _) = room.remove_player(p1).unwrap();
        assert!(dispatch.is_some_and(|d| d.finished.is_none()));
        assert_eq!(room.round.status(), RoundStatus::WaitingForPlayers);
        assert!(room.history.is_empty());
        assert!(room.is_open());
    }
}
