//! Wire protocol for Palace.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Identity** ([`PlayerId`], [`RoomCode`]) — who is acting and where.
//! - **Cards** ([`Card`], [`Suit`], [`Rank`], [`CardColor`]) — the domain
//!   values that travel inside state snapshots.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]) — the tagged JSON
//!   shapes exchanged over the transport.
//! - **Snapshot** ([`RoomSnapshot`]) — the sanitized projection of a room
//!   sent to clients; it is built from serializable fields only and can
//!   never carry a live connection handle.
//! - **Codec** ([`Codec`], [`JsonCodec`]) — how messages become text and
//!   back.
//!
//! The protocol layer sits between transport (text frames) and the room
//! layer (game state). It doesn't know about connections or rooms; it
//! only knows how to describe and serialize messages.

mod cards;
mod codec;
mod error;
mod types;

pub use cards::{Card, CardColor, CardId, Rank, Suit};
pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ClientMessage, PlayerId, PlayerSnapshot, RoleAssignment, RoomCode,
    RoomSnapshot, ServerMessage,
};
