//! Error types for the room layer.

use palace_protocol::RoomCode;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// A room with this code already exists. The registry never
    /// silently overwrites a live room.
    #[error("room code {0} already in use")]
    DuplicateCode(RoomCode),

    /// The room's command channel is closed (actor gone).
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}
