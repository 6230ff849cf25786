//! Codec trait and the JSON implementation.
//!
//! A codec converts between Rust types and the text that travels on the
//! wire. The rest of the system only depends on the [`Codec`] trait, so
//! the encoding can change without touching transport or room code.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to wire text and decodes wire text back.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a text frame.
    fn encode<T: Serialize>(&self, value: &T)
    -> Result<String, ProtocolError>;

    /// Deserializes a text frame back into a value.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &str,
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON via `serde_json`.
///
/// The protocol is consumed by browser clients, so human-readable JSON
/// text frames are the wire format, not a binary encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &str,
    ) -> Result<T, ProtocolError> {
        serde_json::from_str(data).map_err(ProtocolError::Decode)
    }
}
