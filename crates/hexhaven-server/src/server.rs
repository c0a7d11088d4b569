//! WebSocket server and connection handling.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::registry::{Registry, RegistryError, Update};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use hexhaven_core::{GameAction, PlayerId, RulesConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    pub registry: Registry,
    /// Mapping from player ID to their message sender
    pub player_senders: DashMap<PlayerId, mpsc::UnboundedSender<ServerMessage>>,
}

impl ServerState {
    pub fn new(rules: RulesConfig) -> Self {
        Self {
            registry: Registry::new(rules),
            player_senders: DashMap::new(),
        }
    }

    /// Send a message to a specific player.
    pub fn send_to_player(&self, player_id: PlayerId, msg: ServerMessage) {
        if let Some(sender) = self.player_senders.get(&player_id) {
            let _ = sender.send(msg);
        }
    }

    /// Send a message to every listed player except one.
    fn broadcast_except(&self, members: &[PlayerId], except: Option<PlayerId>, msg: ServerMessage) {
        for player_id in members {
            if Some(*player_id) != except {
                self.send_to_player(*player_id, msg.clone());
            }
        }
    }

    /// Tell whoever acts next where they may build.
    fn send_placements(&self, update: &Update) {
        if let Some((player_id, placements)) = &update.placements {
            self.send_to_player(*player_id, ServerMessage::ValidPlacements(placements.clone()));
        }
    }

    fn reject(&self, player_id: PlayerId, err: RegistryError) {
        warn!(%player_id, "rejected: {}", err);
        self.send_to_player(
            player_id,
            ServerMessage::Error {
                message: err.to_string(),
            },
        );
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Hexhaven server listening on {}", addr);

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

    let welcome = serde_json::to_string(&ServerMessage::Welcome { player_id })?;
    ws_sender.send(Message::Text(welcome)).await?;

    // Registered only once the client is known to be reachable
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.player_senders.insert(player_id, tx);

    // Forward queued messages to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!("Failed to encode message: {}", e),
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_message(player_id, client_msg, &state),
                Err(e) => {
                    warn!("Invalid message from {}: {}", player_id, e);
                    state.send_to_player(
                        player_id,
                        ServerMessage::Error {
                            message: "Invalid message".to_string(),
                        },
                    );
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", player_id);
                break;
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", player_id, e);
                break;
            }
            _ => {}
        }
    }

    handle_disconnect(player_id, &state);
    send_task.abort();

    info!("Connection closed for {}", player_id);
    Ok(())
}

/// Handle a client message.
fn handle_message(player_id: PlayerId, msg: ClientMessage, state: &ServerState) {
    let action = match msg {
        ClientMessage::CreateGame { player_name } => {
            match state.registry.create_game(player_id, player_name) {
                Ok(update) => state.send_to_player(
                    player_id,
                    ServerMessage::GameCreated {
                        game_id: update.game_id,
                        game_state: update.snapshot,
                    },
                ),
                Err(e) => state.reject(player_id, e),
            }
            return;
        }

        ClientMessage::JoinGame {
            game_id,
            player_name,
        } => {
            match state.registry.join_game(player_id, &game_id, player_name) {
                Ok(update) => {
                    state.send_to_player(
                        player_id,
                        ServerMessage::GameJoined {
                            game_state: update.snapshot.clone(),
                        },
                    );
                    state.broadcast_except(
                        &update.members,
                        Some(player_id),
                        ServerMessage::PlayerJoined {
                            game_state: update.snapshot,
                        },
                    );
                }
                Err(e) => state.reject(player_id, e),
            }
            return;
        }

        ClientMessage::StartGame => {
            match state.registry.start_game(player_id) {
                Ok(update) => {
                    state.broadcast_except(
                        &update.members,
                        None,
                        ServerMessage::GameStarted {
                            game_state: update.snapshot.clone(),
                        },
                    );
                    state.send_placements(&update);
                }
                Err(e) => state.reject(player_id, e),
            }
            return;
        }

        ClientMessage::ChatMessage { message } => {
            match state.registry.chat(player_id, message) {
                Ok((members, chat)) => {
                    state.broadcast_except(&members, None, ServerMessage::ChatMessage(chat))
                }
                Err(e) => state.reject(player_id, e),
            }
            return;
        }

        ClientMessage::LeaveGame => {
            leave(player_id, state);
            state.send_to_player(player_id, ServerMessage::LeftGame);
            return;
        }

        ClientMessage::ListGames => {
            let games = state.registry.list_games();
            state.send_to_player(player_id, ServerMessage::GameList { games });
            return;
        }

        ClientMessage::Ping => {
            let games = state.registry.session_count();
            state.send_to_player(player_id, ServerMessage::Pong { games });
            return;
        }

        ClientMessage::PlaceBuilding { kind, position } => {
            GameAction::PlaceBuilding { kind, position }
        }
        ClientMessage::RollDice => GameAction::RollDice,
        ClientMessage::MoveRobber { tile_id } => GameAction::MoveRobber { tile_id },
        ClientMessage::EndTurn => GameAction::EndTurn,
    };

    match state.registry.apply(player_id, action) {
        Ok(update) => {
            for event in &update.events {
                debug!(game = %update.game_id, ?event, "game event");
            }
            state.broadcast_except(
                &update.members,
                None,
                ServerMessage::GameStateUpdated {
                    game_state: update.snapshot.clone(),
                },
            );
            state.send_placements(&update);
        }
        Err(e) => state.reject(player_id, e),
    }
}

/// Unseat a player and tell the rest of the table.
fn leave(player_id: PlayerId, state: &ServerState) {
    match state.registry.leave(player_id) {
        Ok(Some(update)) => {
            state.broadcast_except(
                &update.members,
                None,
                ServerMessage::PlayerLeft {
                    game_state: update.snapshot.clone(),
                },
            );
            state.send_placements(&update);
        }
        Ok(None) => {}
        Err(RegistryError::NotInGame) => {}
        Err(e) => warn!(%player_id, "leave failed: {}", e),
    }
}

/// Handle player disconnect.
fn handle_disconnect(player_id: PlayerId, state: &ServerState) {
    leave(player_id, state);
    state.player_senders.remove(&player_id);
}
