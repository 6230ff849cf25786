//! Room layer for Palace: the authoritative game state and its
//! synchronization machinery.
//!
//! Three pieces, leaf-first:
//!
//! - [`deck`] — builds the shuffled 54-card deck a new room starts with.
//! - [`Room`] — the pure, synchronous state machine for one room:
//!   validates and applies joins, draws, and removals under turn-order
//!   and game-over rules. No I/O, fully unit-testable.
//! - [`RoomHandle`]/actor — each room runs as one Tokio task that owns
//!   its `Room` and the members' outbound channels. All mutations of a
//!   room flow through its command channel, so exactly one mutation is
//!   in flight per room without any lock. After every accepted mutation
//!   the actor broadcasts the full sanitized snapshot to every member.
//! - [`RoomRegistry`] — the single process-wide map from room code to
//!   room handle. Rooms are added on creation and removed the moment
//!   they become empty.

mod actor;
mod deck;
mod error;
mod registry;
mod room;

pub use actor::{LeaveOutcome, PlayerSender, RoomHandle};
pub use deck::{DECK_SIZE, fresh_deck};
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{DrawOutcome, JoinOutcome, Player, RemovalOutcome, Room};
