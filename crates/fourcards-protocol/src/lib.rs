//! Wire protocol for the four cards session client.
//!
//! This crate defines the language the browser-side table and the game
//! server speak:
//!
//! - **Types** ([`InboundMessage`], [`OutboundIntent`], [`GameSnapshot`], ...)
//!   are the records that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) converts them to and from
//!   bytes; [`decode_inbound`] and [`encode_intent`] are the two entry
//!   points the client uses.
//! - **Errors** ([`ProtocolError`]) describe what can go wrong while doing
//!   so.
//!
//! ```text
//! Transport (bytes) → Protocol (InboundMessage) → Session (Session, GameView)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, decode_inbound, encode_intent};
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    CardRef, CardSelection, GameOverSnapshot, GameSnapshot, InboundMessage, OutboundIntent,
    PlayArea, PlaySlot, PlayerSummary, SessionId,
};
