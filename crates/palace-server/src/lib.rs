//! # Palace server
//!
//! The runnable card-game coordinator: accepts WebSocket connections,
//! binds each to a fresh player identity, routes createRoom / joinRoom /
//! drawCard messages into the room layer, and cleans up on disconnect.
//!
//! Layering, bottom up:
//!
//! ```text
//! palace-transport (text frames) → palace-protocol (messages)
//!     → palace-room (authoritative state) → this crate (lifecycle)
//! ```
//!
//! See [`PalaceServer`] for the entry point.

mod error;
mod handler;
mod server;

pub use error::ServerError;
pub use server::{PalaceServer, PalaceServerBuilder};
