//! Per-connection handler: identity, message routing, and disconnect
//! cleanup.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. The flow is:
//!   1. Mint a fresh `PlayerId`, send the `connected` greeting.
//!   2. Spawn a writer task draining the connection's outbound channel;
//!      every message to this client (greeting, errors, broadcasts from
//!      room actors) goes through that one channel.
//!   3. Loop: receive text frames, decode, dispatch by action type.
//!   4. On close: leave the current room, which triggers host transfer,
//!      turn-pointer reset, and empty-room destruction as needed.

use std::sync::Arc;

use palace_protocol::{ClientMessage, Codec, PlayerId, RoomCode, ServerMessage};
use palace_room::PlayerSender;
use palace_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::ServerError;
use crate::server::ServerState;

/// Error text for a join targeting an unknown room.
const ROOM_NOT_FOUND_MSG: &str = "Room does not exist.";

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), ServerError> {
    let conn_id = conn.id();
    let player_id = PlayerId::fresh();
    tracing::info!(%conn_id, %player_id, "player connected");

    let (outbound_tx, mut outbound_rx) =
        mpsc::unbounded_channel::<ServerMessage>();

    // Writer task: the only place this connection is written to.
    let writer_conn = conn.clone();
    let writer_codec = state.codec;
    tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let text = match writer_codec.encode(&msg) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        "failed to encode outbound message"
                    );
                    continue;
                }
            };
            if writer_conn.send(&text).await.is_err() {
                break;
            }
        }
    });

    let _ = outbound_tx.send(ServerMessage::Connected {
        user_id: player_id.clone(),
    });

    // The room this connection's player is currently in.
    let mut current_room: Option<RoomCode> = None;

    loop {
        let text = match conn.recv().await {
            Ok(Some(text)) => text,
            Ok(None) => {
                tracing::info!(%player_id, "connection closed");
                break;
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&text) {
            Ok(msg) => msg,
            Err(e) => {
                // Malformed payload or unrecognized type: diagnostics
                // only. No reply, connection stays open.
                tracing::debug!(
                    %player_id,
                    error = %e,
                    "ignoring unparseable message"
                );
                continue;
            }
        };

        handle_client_message(
            &state,
            &player_id,
            &outbound_tx,
            &mut current_room,
            msg,
        )
        .await;
    }

    leave_current_room(&state, &player_id, &mut current_room).await;
    // Dropping outbound_tx ends the writer task once room actors have
    // released their clones.
    Ok(())
}

/// Routes one decoded client message.
async fn handle_client_message(
    state: &Arc<ServerState>,
    player_id: &PlayerId,
    outbound: &PlayerSender,
    current_room: &mut Option<RoomCode>,
    msg: ClientMessage,
) {
    match msg {
        ClientMessage::CreateRoom => {
            leave_current_room(state, player_id, current_room).await;

            // generate_code and create under one lock so the code is
            // still fresh when the room is inserted.
            let created = {
                let mut registry = state.registry.lock().await;
                let code = registry.generate_code();
                registry.create(code, player_id.clone())
            };

            match created {
                Ok(handle) => {
                    if handle
                        .join(player_id.clone(), outbound.clone())
                        .await
                        .is_ok()
                    {
                        *current_room =
                            Some(handle.room_code().clone());
                    }
                }
                Err(e) => {
                    tracing::error!(
                        %player_id,
                        error = %e,
                        "room creation failed"
                    );
                }
            }
        }

        ClientMessage::JoinRoom { room_id } => {
            let handle = state.registry.lock().await.get(&room_id);
            let Some(handle) = handle else {
                let _ = outbound.send(ServerMessage::Error {
                    message: ROOM_NOT_FOUND_MSG.into(),
                });
                return;
            };

            // Switching rooms leaves the old one first; rejoining the
            // current room falls through to the actor's idempotent join.
            if current_room.as_ref() != Some(&room_id) {
                leave_current_room(state, player_id, current_room).await;
            }

            match handle.join(player_id.clone(), outbound.clone()).await {
                Ok(()) => *current_room = Some(room_id),
                Err(e) => {
                    // Room vanished between lookup and join.
                    tracing::debug!(
                        %player_id,
                        error = %e,
                        "join raced room destruction"
                    );
                    let _ = outbound.send(ServerMessage::Error {
                        message: ROOM_NOT_FOUND_MSG.into(),
                    });
                }
            }
        }

        ClientMessage::DrawCard => {
            let Some(code) = current_room.as_ref() else {
                tracing::debug!(%player_id, "draw without a room, ignoring");
                return;
            };
            let handle = state.registry.lock().await.get(code);
            if let Some(handle) = handle {
                // Fire-and-forget: stale draws resolve to silence.
                let _ = handle.draw(player_id.clone()).await;
            }
        }
    }
}

/// Removes the player from their current room, if any. The registry
/// drops the room when it reports itself empty.
async fn leave_current_room(
    state: &Arc<ServerState>,
    player_id: &PlayerId,
    current_room: &mut Option<RoomCode>,
) {
    if let Some(code) = current_room.take() {
        let mut registry = state.registry.lock().await;
        match registry.leave(&code, player_id.clone()).await {
            Ok(outcome) => {
                tracing::debug!(
                    %player_id,
                    %code,
                    room_empty = outcome.room_empty,
                    "left room"
                );
            }
            Err(e) => {
                tracing::debug!(
                    %player_id,
                    %code,
                    error = %e,
                    "leave failed"
                );
            }
        }
    }
}
