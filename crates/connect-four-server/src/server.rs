//! WebSocket server and connection handling.

use crate::protocol::{ClientMessage, RoomInfo, ServerMessage};
use crate::room::{Dispatch, GameRoom, RoomError};
use connect_four_core::Command;
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    /// All active rooms
    pub rooms: DashMap<Uuid, GameRoom>,
    /// Mapping from player ID to their room ID
    pub player_rooms: DashMap<Uuid, Uuid>,
    /// Mapping from player ID to their message sender
    pub player_senders: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            player_rooms: DashMap::new(),
            player_senders: DashMap::new(),
        }
    }

    /// Send a message to a specific player.
    pub fn send_to_player(&self, player_id: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.player_senders.get(&player_id) {
            let _ = sender.send(msg);
        }
    }

    /// Broadcast a message to all players in a room.
    pub fn broadcast_to_room(&self, room_id: Uuid, msg: ServerMessage) {
        let members: Vec<Uuid> = match self.rooms.get(&room_id) {
            Some(room) => room.players.keys().copied().collect(),
            None => return,
        };
        for player_id in members {
            self.send_to_player(player_id, msg.clone());
        }
    }

    /// Get list of rooms with a free seat.
    pub fn get_open_rooms(&self) -> Vec<RoomInfo> {
        self.rooms
            .iter()
            .filter(|r| r.is_open())
            .map(|r| r.to_info())
            .collect()
    }

    fn send_error(&self, player_id: Uuid, err: RoomError) {
        let msg = match err {
            RoomError::Game(error) => ServerMessage::Rejected { error },
            other => ServerMessage::Error {
                message: other.to_string(),
            },
        };
        self.send_to_player(player_id, msg);
    }

    /// Broadcast the result of a successful command to the room.
    fn publish(&self, room_id: Uuid, dispatch: Dispatch) {
        let Dispatch {
            round_id,
            events,
            state,
            finished,
        } = dispatch;

        self.broadcast_to_room(room_id, ServerMessage::Events { events });
        self.broadcast_to_room(room_id, ServerMessage::RoundState { round_id, state });

        if let Some(record) = finished {
            let room_info = self.rooms.get(&room_id).map(|room| room.to_info());
            if let Some(room) = room_info {
                self.broadcast_to_room(
                    room_id,
                    ServerMessage::RoundOver {
                        record,
                        next_round_id: room.round_id,
                    },
                );
                self.broadcast_to_room(room_id, ServerMessage::RoomUpdated { room });
            }
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Connect Four server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let player_id = Uuid::new_v4();

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.player_senders.insert(player_id, tx);

    let welcome = ServerMessage::Welcome { player_id };
    let msg_text = serde_json::to_string(&welcome)?;
    ws_sender.send(Message::Text(msg_text)).await?;

    // Forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_message(player_id, client_msg, &state),
                Err(e) => warn!("Invalid message from {}: {}", player_id, e),
            },
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", player_id);
                break;
            }
            Ok(Message::Ping(_)) => {
                state.send_to_player(player_id, ServerMessage::Pong);
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", player_id, e);
                break;
            }
            _ => {}
        }
    }

    // A dropped connection is a departure
    leave_room(player_id, &state);
    state.player_senders.remove(&player_id);
    send_task.abort();

    info!("Connection closed for {}", player_id);
    Ok(())
}

/// Handle a client message.
fn handle_message(player_id: Uuid, msg: ClientMessage, state: &Arc<ServerState>) {
    match msg {
        ClientMessage::CreateRoom { player_name } => {
            leave_room(player_id, state);

            let room_id = Uuid::new_v4();
            let mut room = GameRoom::new(room_id, &player_name);
            match room.add_player(player_id, player_name) {
                Ok(dispatch) => {
                    let room_info = room.to_info();
                    state.rooms.insert(room_id, room);
                    state.player_rooms.insert(player_id, room_id);

                    state.send_to_player(player_id, ServerMessage::RoomCreated { room_id });
                    state.send_to_player(player_id, ServerMessage::JoinedRoom { room: room_info });
                    state.publish(room_id, dispatch);
                }
                Err(e) => state.send_error(player_id, e),
            }
        }

        ClientMessage::JoinRoom {
            room_id,
            player_name,
        } => {
            let elsewhere = state
                .player_rooms
                .get(&player_id)
                .is_some_and(|current| *current != room_id);
            if elsewhere {
                leave_room(player_id, state);
            }

            let result = match state.rooms.get_mut(&room_id) {
                Some(mut room) => room
                    .add_player(player_id, player_name)
                    .map(|dispatch| (dispatch, room.to_info())),
                None => {
                    state.send_to_player(
                        player_id,
                        ServerMessage::Error {
                            message: "Room not found".to_string(),
                        },
                    );
                    return;
                }
            };

            match result {
                Ok((dispatch, room_info)) => {
                    state.player_rooms.insert(player_id, room_id);
                    state.send_to_player(
                        player_id,
                        ServerMessage::JoinedRoom {
                            room: room_info.clone(),
                        },
                    );
                    state.broadcast_to_room(room_id, ServerMessage::RoomUpdated { room: room_info });
                    state.publish(room_id, dispatch);
                }
                Err(e) => state.send_error(player_id, e),
            }
        }

        ClientMessage::JoinRound { round_id } => {
            round_command(player_id, round_id, Command::Join, state);
        }

        ClientMessage::StartGame { round_id } => {
            round_command(player_id, round_id, Command::Start, state);
        }

        ClientMessage::Move {
            round_id,
            column,
            row,
        } => {
            round_command(player_id, round_id, Command::Move { column, row }, state);
        }

        ClientMessage::LeaveRound { round_id } => {
            round_command(player_id, round_id, Command::Leave, state);
        }

        ClientMessage::LeaveRoom => {
            if leave_room(player_id, state) {
                state.send_to_player(player_id, ServerMessage::LeftRoom);
            }
        }

        ClientMessage::ListRooms => {
            let rooms = state.get_open_rooms();
            state.send_to_player(player_id, ServerMessage::RoomList { rooms });
        }

        ClientMessage::History => {
            let rounds = state
                .player_rooms
                .get(&player_id)
                .and_then(|room_id| state.rooms.get(&*room_id).map(|r| r.history.clone()))
                .unwrap_or_default();
            state.send_to_player(player_id, ServerMessage::History { rounds });
        }

        ClientMessage::Ping => {
            state.send_to_player(player_id, ServerMessage::Pong);
        }
    }
}

/// Apply a command to the round in the player's current room.
fn round_command(player_id: Uuid, round_id: Uuid, command: Command, state: &Arc<ServerState>) {
    let Some(room_id) = state.player_rooms.get(&player_id).map(|r| *r) else {
        state.send_to_player(
            player_id,
            ServerMessage::Error {
                message: "Not in a room".to_string(),
            },
        );
        return;
    };

    // Release the room lock before broadcasting
    let result = match state.rooms.get_mut(&room_id) {
        Some(mut room) => room.apply(player_id, round_id, command),
        None => return,
    };

    match result {
        Ok(dispatch) => {
            debug!(%player_id, ?command, "command applied");
            state.publish(room_id, dispatch);
        }
        Err(e) => state.send_error(player_id, e),
    }
}

/// Take a player out of their room, forfeiting any game in progress.
///
/// Returns false if the player was not in a room.
fn leave_room(player_id: Uuid, state: &Arc<ServerState>) -> bool {
    let Some((_, room_id)) = state.player_rooms.remove(&player_id) else {
        return false;
    };

    let result = match state.rooms.get_mut(&room_id) {
        Some(mut room) => room.remove_player(player_id),
        None => return true,
    };

    match result {
        Ok((dispatch, is_empty)) => {
            if is_empty {
                state.rooms.remove(&room_id);
                return true;
            }
            if let Some(dispatch) = dispatch {
                state.publish(room_id, dispatch);
            }
            let room_info = state.rooms.get(&room_id).map(|room| room.to_info());
            if let Some(room) = room_info {
                state.broadcast_to_room(room_id, ServerMessage::RoomUpdated { room });
            }
        }
        Err(e) => warn!("Failed to remove {} from room {}: {}", player_id, room_id, e),
    }
    true
}
