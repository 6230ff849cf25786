//! Unified error type for the server crate.

use palace_protocol::ProtocolError;
use palace_room::RoomError;
use palace_transport::TransportError;

/// Top-level error that wraps the layer-specific errors.
///
/// The `#[from]` attributes let `?` convert layer errors automatically,
/// so callers deal with a single type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, duplicate code, unavailable).
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Transport(_)));
        assert!(server_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NotFound(palace_protocol::RoomCode::new("X"));
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Room(_)));
    }
}
