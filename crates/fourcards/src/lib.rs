//! # Four Cards
//!
//! Realtime session client for the four cards table game.
//!
//! The server is authoritative: it owns the deck, the rules and the turn
//! order. This crate keeps a local mirror of one table in sync with it over
//! a WebSocket, turns user actions into outbound intents, narrates what
//! happens, and hands everything worth showing to a [`Presentation`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fourcards::prelude::*;
//!
//! // Implement Presentation for your UI, then:
//! // let config = ClientConfig::from_page_url("https://host/k3x9")?;
//! // let client = SessionClient::connect(config, WebSocketConnector, my_ui);
//! // client.join("alice").await?;
//! // client.play(CardSelection::Hand(1)).await?;
//! ```

mod client;
mod config;
mod error;
mod presentation;
pub mod routing;

pub use client::{ClientHandle, SessionClient, SessionSnapshot};
pub use config::ClientConfig;
pub use error::ClientError;
pub use presentation::Presentation;

pub use fourcards_protocol as protocol;
pub use fourcards_session as session;
pub use fourcards_transport as transport;

pub mod prelude {
    pub use crate::{ClientConfig, ClientError, ClientHandle, Presentation, SessionClient};
    pub use fourcards_protocol::{CardRef, CardSelection, OutboundIntent, PlayerSummary, SessionId};
    pub use fourcards_session::{ConnectionPhase, NarrationEntry, Severity};
    #[cfg(feature = "websocket")]
    pub use fourcards_transport::WebSocketConnector;
}
