//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The client doesn't care HOW messages are turned into bytes, only that
//! something implements [`Codec`]. The game server speaks JSON, so
//! [`JsonCodec`] is the one in use; the trait keeps the session client
//! independent of that choice.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{InboundMessage, OutboundIntent, PlaySlot, ProtocolError};

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because the codec lives inside the session
/// client's long-running Tokio task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// Just the discriminator, used to name unknown kinds in logs.
#[derive(Deserialize)]
struct Tag {
    #[serde(rename = "type")]
    kind: String,
}

/// Decodes one server frame.
///
/// Unknown `type`s are not an error: they come back as
/// [`InboundMessage::Unknown`] for the dispatcher to ignore.
pub fn decode_inbound<C: Codec>(codec: &C, data: &[u8]) -> Result<InboundMessage, ProtocolError> {
    let msg: InboundMessage = codec.decode(data)?;
    if msg == InboundMessage::Unknown {
        let kind = codec
            .decode::<Tag>(data)
            .map(|tag| tag.kind)
            .unwrap_or_default();
        tracing::debug!(kind, "ignoring unknown inbound message kind");
    }
    Ok(msg)
}

/// Encodes one intent for the wire.
///
/// # Errors
/// Returns [`ProtocolError::InvalidMessage`] for a card position of 0
/// (positions are 1-based), or an encode error from the codec.
pub fn encode_intent<C: Codec>(codec: &C, intent: &OutboundIntent) -> Result<Vec<u8>, ProtocolError> {
    let position = match intent {
        OutboundIntent::PlayFrom { card } => Some(*card),
        OutboundIntent::PlayTo {
            card: PlaySlot::Position(card),
            ..
        } => Some(*card),
        _ => None,
    };
    if position == Some(0) {
        return Err(ProtocolError::InvalidMessage(format!(
            "{}: card positions start at 1",
            intent.kind()
        )));
    }
    codec.encode(intent)
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use fourcards_protocol::{JsonCodec, InboundMessage, decode_inbound};
///
/// let msg = decode_inbound(&JsonCodec, br#"{"type":"leave","username":"bob"}"#).unwrap();
/// assert_eq!(msg, InboundMessage::Leave { username: "bob".into() });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
