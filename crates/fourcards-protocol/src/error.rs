//! Error types for the protocol layer.

/// Errors that can occur while encoding intents or decoding server
/// messages.
///
/// A decode failure is never fatal: the session client logs it, drops the
/// frame and keeps the connection.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: the frame is not JSON, has no `type`, or a
    /// known `type` came with the wrong fields.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// An outbound intent is well-typed but not valid on the wire, such as
    /// a card position of 0.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl ProtocolError {
    /// Returns `true` for errors raised while reading a server frame.
    pub fn is_decode(&self) -> bool {
        match self {
            #[cfg(feature = "json")]
            Self::Decode(_) => true,
            Self::InvalidMessage(_) => false,
            #[cfg(feature = "json")]
            Self::Encode(_) => false,
        }
    }
}
