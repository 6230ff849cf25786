//! Identity and message types for the Palace wire format.
//!
//! Every message on the wire is a single JSON object with a `type` tag,
//! produced by the internally tagged serde enums below. Clients send
//! [`ClientMessage`]; the server answers with [`ServerMessage`]. Room
//! state always travels as a whole [`RoomSnapshot`]; the protocol is
//! state-snapshot replication, so a client that misses a message is
//! healed by the next one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Card;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player, tied to one live connection.
///
/// Newtype over the UUID string the server mints at connect time.
/// `#[serde(transparent)]` keeps the wire form a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Mints a fresh identifier for a new connection.
    pub fn fresh() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wraps an existing identifier (tests, deserialized values).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The leading characters used to derive a display name.
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(4)
            .map_or(self.0.len(), |(i, _)| i);
        &self.0[..end]
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A short uppercase alphanumeric code identifying a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Length of generated codes.
    pub const LEN: usize = 5;

    const CHARSET: &'static [u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    /// Generates a random code. Uniqueness against live rooms is the
    /// registry's job; it re-rolls on collision.
    pub fn generate() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();
        let code = (0..Self::LEN)
            .map(|_| {
                Self::CHARSET[rng.random_range(0..Self::CHARSET.len())]
                    as char
            })
            .collect();
        Self(code)
    }

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Inbound messages
// ---------------------------------------------------------------------------

/// Messages a client can send.
///
/// `#[serde(tag = "type")]` produces the internally tagged form, e.g.
/// `{ "type": "joinRoom", "roomId": "A1B2C" }`. Unknown fields are
/// ignored; an unknown `type` fails to parse and is dropped by the
/// connection handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    /// Create a fresh room and auto-join as host.
    CreateRoom,
    /// Join the named room.
    JoinRoom { room_id: RoomCode },
    /// Draw a card in the current room.
    DrawCard,
}

// ---------------------------------------------------------------------------
// Outbound messages
// ---------------------------------------------------------------------------

/// Messages the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// Sent once, immediately after the connection is accepted.
    Connected { user_id: PlayerId },
    /// Sent to a single client whose request failed (e.g. joining a
    /// room that does not exist). Room state is untouched.
    Error { message: String },
    /// The authoritative room state, broadcast to every member after
    /// any accepted mutation.
    GameStateUpdate { game_state: RoomSnapshot },
}

// ---------------------------------------------------------------------------
// Room snapshot
// ---------------------------------------------------------------------------

/// One player as seen in a snapshot: identity, display name, held cards.
/// Deliberately a projection type: the live outbound channel a player
/// is reachable on is not part of it and cannot leak to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub hand: Vec<Card>,
}

/// Role designations accumulated over a room's lifetime.
///
/// `emperor` is single-slot, last-writer-wins. `missies` and `servants`
/// only ever grow, and hold each player at most once.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub emperor: Option<PlayerId>,
    pub missies: Vec<PlayerId>,
    pub servants: Vec<PlayerId>,
}

impl RoleAssignment {
    /// Crowns a new emperor, replacing any previous one.
    pub fn crown_emperor(&mut self, player: PlayerId) {
        self.emperor = Some(player);
    }

    /// Adds a missy if not already one.
    pub fn add_missy(&mut self, player: PlayerId) {
        if !self.missies.contains(&player) {
            self.missies.push(player);
        }
    }

    /// Adds a servant if not already one.
    pub fn add_servant(&mut self, player: PlayerId) {
        if !self.servants.contains(&player) {
            self.servants.push(player);
        }
    }
}

/// The sanitized, serializable projection of a room sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_id: RoomCode,
    pub host_id: PlayerId,
    pub players: Vec<PlayerSnapshot>,
    pub deck: Vec<Card>,
    pub current_player_index: usize,
    pub last_drawn_card: Option<Card>,
    pub game_log: Vec<String>,
    pub roles: RoleAssignment,
    pub is_game_over: bool,
}

// =========================================================================
// Tests
// =========================================================================
