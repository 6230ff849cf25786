//! Room actor: an isolated Tokio task that owns one room.
//!
//! Each room runs in its own task, communicating with connection
//! handlers through an mpsc channel. Commands are processed one at a
//! time, so exactly one mutation is ever in flight per room: the
//! exclusion guarantee the state machine relies on, with no lock and
//! without serializing unrelated rooms against each other.

use std::collections::HashMap;

use palace_protocol::{PlayerId, RoomCode, RoomSnapshot, ServerMessage};
use tokio::sync::{mpsc, oneshot};

use crate::room::{DrawOutcome, JoinOutcome, RemovalOutcome, Room};
use crate::RoomError;

/// Channel sender for delivering outbound messages to a player's
/// connection handler.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Result of a leave request, as seen by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveOutcome {
    /// Whether the player was actually a member.
    pub was_member: bool,
    /// Whether the room's player list became empty. The actor has
    /// already stopped itself when this is true; the registry must drop
    /// the handle.
    pub room_empty: bool,
}

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    /// Add a player together with their outbound channel.
    Join {
        player_id: PlayerId,
        sender: PlayerSender,
        reply: oneshot::Sender<()>,
    },

    /// Apply a draw for a player. Fire-and-forget: stale draws resolve
    /// to silence, never to an error.
    Draw { player_id: PlayerId },

    /// Remove a player (disconnect or room switch).
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<LeaveOutcome>,
    },

    /// Request the current sanitized snapshot.
    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },
}

/// Handle to a running room actor. Cheap to clone; it wraps an
/// `mpsc::Sender`. The registry holds one per room.
#[derive(Clone)]
pub struct RoomHandle {
    room_code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's code.
    pub fn room_code(&self) -> &RoomCode {
        &self.room_code
    }

    /// Adds a player to the room. Idempotent for existing members.
    pub async fn join(
        &self,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                player_id,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))
    }

    /// Requests a draw for the player (fire-and-forget).
    pub async fn draw(&self, player_id: PlayerId) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Draw { player_id })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))
    }

    /// Removes a player from the room.
    pub async fn leave(
        &self,
        player_id: PlayerId,
    ) -> Result<LeaveOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                player_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))
    }

    /// Requests the current snapshot.
    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code.clone()))
    }
}

/// The internal room actor. Runs inside a Tokio task.
struct RoomActor {
    room: Room,
    /// Per-member outbound channels, kept beside the room state so the
    /// serializable `Room` never holds a transport handle.
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop until the room empties or every handle is
    /// dropped.
    async fn run(mut self) {
        tracing::info!(room_code = %self.room.room_code, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player_id,
                    sender,
                    reply,
                } => {
                    self.handle_join(player_id, sender);
                    let _ = reply.send(());
                }
                RoomCommand::Draw { player_id } => {
                    self.handle_draw(player_id);
                }
                RoomCommand::Leave { player_id, reply } => {
                    let outcome = self.handle_leave(player_id);
                    let _ = reply.send(outcome);
                    if outcome.room_empty {
                        break;
                    }
                }
                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send(self.room.snapshot());
                }
            }
        }

        tracing::info!(room_code = %self.room.room_code, "room actor stopped");
    }

    fn handle_join(&mut self, player_id: PlayerId, sender: PlayerSender) {
        match self.room.join(player_id.clone()) {
            JoinOutcome::AlreadyMember => {
                tracing::debug!(
                    room_code = %self.room.room_code,
                    %player_id,
                    "join ignored, already a member"
                );
            }
            JoinOutcome::Joined => {
                self.senders.insert(player_id.clone(), sender);
                tracing::info!(
                    room_code = %self.room.room_code,
                    %player_id,
                    players = self.room.players.len(),
                    "player joined"
                );
                self.broadcast();
            }
        }
    }

    fn handle_draw(&mut self, player_id: PlayerId) {
        match self.room.draw(&player_id) {
            DrawOutcome::Drawn { card, held } => {
                tracing::debug!(
                    room_code = %self.room.room_code,
                    %player_id,
                    card = %card,
                    held,
                    game_over = self.room.is_game_over,
                    "card drawn"
                );
                self.broadcast();
            }
            DrawOutcome::Ignored => {
                // Stale or out-of-turn request: no reply, no broadcast.
                tracing::debug!(
                    room_code = %self.room.room_code,
                    %player_id,
                    "draw ignored"
                );
            }
        }
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> LeaveOutcome {
        self.senders.remove(&player_id);
        match self.room.remove_player(&player_id) {
            RemovalOutcome::NotAMember => LeaveOutcome {
                was_member: false,
                room_empty: false,
            },
            RemovalOutcome::Removed { now_empty: true } => {
                tracing::info!(
                    room_code = %self.room.room_code,
                    %player_id,
                    "last player left"
                );
                LeaveOutcome {
                    was_member: true,
                    room_empty: true,
                }
            }
            RemovalOutcome::Removed { now_empty: false } => {
                tracing::info!(
                    room_code = %self.room.room_code,
                    %player_id,
                    players = self.room.players.len(),
                    host = %self.room.host_id,
                    "player left"
                );
                self.broadcast();
                LeaveOutcome {
                    was_member: true,
                    room_empty: false,
                }
            }
        }
    }

    /// Fans the current snapshot out to every member.
    ///
    /// Best-effort per member: a send failure means that player's
    /// connection handler is gone; they are skipped without failing the
    /// room. There is no retry; snapshot replication self-heals on the
    /// next broadcast.
    fn broadcast(&self) {
        let update = ServerMessage::GameStateUpdate {
            game_state: self.room.snapshot(),
        };
        for (player_id, sender) in &self.senders {
            if sender.send(update.clone()).is_err() {
                tracing::debug!(
                    room_code = %self.room.room_code,
                    %player_id,
                    "member unreachable, skipping broadcast"
                );
            }
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
///
/// `channel_size` bounds the command channel; senders wait when the
/// room is backlogged.
pub(crate) fn spawn_room(room: Room, channel_size: usize) -> RoomHandle {
    let room_code = room.room_code.clone();
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        room,
        senders: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_code,
        sender: tx,
    }
}
