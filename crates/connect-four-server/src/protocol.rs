//! WebSocket protocol messages for Connect Four rooms.

use connect_four_core::{Color, GameError, GameEvent, RoundSnapshot, RoundStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
///
/// Commands aimed at a round name the round they were issued against, so
/// a command sent just before the round changed is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Create a new room and take a seat in its first round
    CreateRoom { player_name: String },

    /// Enter an existing room and take a seat in its active round
    JoinRoom { room_id: Uuid, player_name: String },

    /// Take a seat in the room's active round
    JoinRound { round_id: Uuid },

    /// Mark yourself ready to play
    StartGame { round_id: Uuid },

    /// Place a disc
    Move { round_id: Uuid, column: usize, row: usize },

    /// Give up your seat (forfeits a game in progress)
    LeaveRound { round_id: Uuid },

    /// Leave the room entirely
    LeaveRoom,

    /// Request room list
    ListRooms,

    /// Request finished rounds for the current room
    History,

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with assigned player ID
    Welcome { player_id: Uuid },

    /// Room created successfully
    RoomCreated { room_id: Uuid },

    /// Joined room successfully
    JoinedRoom { room: RoomInfo },

    /// Left room successfully
    LeftRoom,

    /// Room membership or seating changed
    RoomUpdated { room: RoomInfo },

    /// Current state of a round
    RoundState {
        round_id: Uuid,
        state: RoundSnapshot<Uuid>,
    },

    /// What a command changed
    Events { events: Vec<GameEvent<Uuid>> },

    /// A round finished and a new one is open for seating
    RoundOver { record: RoundRecord, next_round_id: Uuid },

    /// The game rejected a command
    Rejected { error: GameError },

    /// List of available rooms
    RoomList { rooms: Vec<RoomInfo> },

    /// Finished rounds in the current room, oldest first
    History { rounds: Vec<RoundRecord> },

    /// Error occurred
    Error { message: String },

    /// Pong response
    Pong,
}

/// Room information for clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInfo {
    pub id: Uuid,
    pub name: String,
    pub players: Vec<PlayerInfo>,
    pub round_id: Uuid,
    pub status: RoundStatus,
}

/// Player information in a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: Uuid,
    pub name: String,
    pub color: Option<Color>,
    pub ready: bool,
}

/// Outcome of a finished round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round_id: Uuid,
    pub red: Option<Uuid>,
    pub yellow: Option<Uuid>,
    /// Absent on a tie
    pub winner: Option<Uuid>,
    pub moves: usize,
}
