//! Local session state for the four cards session client.
//!
//! This crate holds everything the client knows about a table and the
//! rules for changing it:
//!
//! 1. **Session** ([`Session`]): table id, player name, connection and
//!    game phases, lobby roster
//! 2. **View** ([`GameView`]): the mirror of the server's game state
//! 3. **Narration** ([`NarrationLog`]): display-only log of notable events
//! 4. **Dispatch** ([`dispatch`]): the pure function that turns one inbound
//!    message into the next session, view, narration and effects
//!
//! # How it fits in the stack
//!
//! ```text
//! Client (above)  ← owns the state, applies Dispatch results, drives I/O
//!     ↕
//! Session Layer (this crate)  ← pure state and reconciliation rules
//!     ↕
//! Protocol Layer (below)  ← provides InboundMessage, OutboundIntent
//! ```

mod dispatch;
mod error;
mod narration;
mod session;
mod view;

pub use dispatch::{Dispatch, Effect, dispatch};
pub use error::SessionError;
pub use narration::{Narration, NarrationEntry, NarrationLog, Severity, narrate};
pub use session::{ConnectionPhase, GamePhase, Session};
pub use view::{GameView, RenderSet};
