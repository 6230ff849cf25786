//! Room registry: the process-wide map from room code to live room.

use std::collections::HashMap;

use palace_protocol::{PlayerId, RoomCode};

use crate::actor::{LeaveOutcome, spawn_room};
use crate::{Room, RoomError, RoomHandle};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Tracks every active room. Created empty at server startup; entries
/// are added on room creation and removed the instant a room's player
/// list becomes empty. All components reach rooms only through here;
/// removal makes a room unreachable from future lookups.
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, RoomHandle>,
}

impl RoomRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
        }
    }

    /// Generates a room code that is unused in this registry.
    ///
    /// Collisions are unlikely at this scale but re-rolled anyway; the
    /// paired [`create`](Self::create) still rejects a duplicate rather
    /// than silently overwriting, keeping the contract honest.
    pub fn generate_code(&self) -> RoomCode {
        loop {
            let code = RoomCode::generate();
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }

    /// Creates a room under `code` with `host_id` as its designated
    /// host, spawns its actor, and registers the handle.
    pub fn create(
        &mut self,
        code: RoomCode,
        host_id: PlayerId,
    ) -> Result<RoomHandle, RoomError> {
        if self.rooms.contains_key(&code) {
            return Err(RoomError::DuplicateCode(code));
        }
        let handle = spawn_room(
            Room::new(code.clone(), host_id),
            DEFAULT_CHANNEL_SIZE,
        );
        self.rooms.insert(code.clone(), handle.clone());
        tracing::info!(%code, "room created");
        Ok(handle)
    }

    /// Looks up a room, returning a cloned handle.
    pub fn get(&self, code: &RoomCode) -> Option<RoomHandle> {
        self.rooms.get(code).cloned()
    }

    /// Unregisters a room. Dropping the last handle ends its actor.
    pub fn remove(&mut self, code: &RoomCode) {
        if self.rooms.remove(code).is_some() {
            tracing::info!(%code, "room removed");
        }
    }

    /// Removes a player from a room, dropping the room from the
    /// registry when it reports itself empty.
    pub async fn leave(
        &mut self,
        code: &RoomCode,
        player_id: PlayerId,
    ) -> Result<LeaveOutcome, RoomError> {
        let handle = self
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let outcome = handle.leave(player_id).await?;
        if outcome.room_empty {
            self.remove(code);
        }
        Ok(outcome)
    }

    /// Returns the number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Lists all active room codes.
    pub fn codes(&self) -> Vec<RoomCode> {
        self.rooms.keys().cloned().collect()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
