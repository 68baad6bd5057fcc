//! Session types: who we are at the table and how connected we are.
//!
//! A [`Session`] is the client's record of one game table. It tracks:
//! - WHICH table (`session_id`, kept across reconnects)
//! - WHO we are there (`local_player`)
//! - HOW the connection is doing ([`ConnectionPhase`])
//! - WHERE the game is ([`GamePhase`], `has_game_started`, the lobby roster)

use std::fmt;

use fourcards_protocol::{OutboundIntent, SessionId};

use crate::SessionError;

// ---------------------------------------------------------------------------
// ConnectionPhase
// ---------------------------------------------------------------------------

/// Lifecycle of the connection to the server.
///
/// ```text
///   Idle ──→ Connecting ──→ Connected ──(failure)──→ DisconnectedRetrying
///                ↑  │                                        │
///                │  └──────(failed attempt)─────────────────→│
///                └─────────────(retry delay)─────────────────┘
///
///   any phase except DisconnectedTerminal ──(close)──→ DisconnectedTerminal
/// ```
///
/// `Connected` is the only phase in which intents may be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionPhase {
    /// Nothing attempted yet.
    #[default]
    Idle,
    /// A connect attempt is in flight.
    Connecting,
    /// The transport is up; intents flow.
    Connected,
    /// The transport failed; a new attempt is scheduled.
    DisconnectedRetrying,
    /// Closed for good. Nothing will reconnect.
    DisconnectedTerminal,
}

impl ConnectionPhase {
    /// Returns `true` if intents may be sent in this phase.
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns `true` once nothing will ever reconnect.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::DisconnectedTerminal)
    }

    /// Returns `true` if moving from `self` to `target` is a legal edge.
    pub fn can_transition_to(self, target: Self) -> bool {
        use ConnectionPhase::*;
        match (self, target) {
            (DisconnectedTerminal, _) => false,
            (_, DisconnectedTerminal) => true,
            (Idle, Connecting)
            | (Connecting, Connected)
            | (Connecting, DisconnectedRetrying)
            | (Connected, DisconnectedRetrying)
            | (DisconnectedRetrying, Connecting) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
            Self::DisconnectedRetrying => write!(f, "DisconnectedRetrying"),
            Self::DisconnectedTerminal => write!(f, "DisconnectedTerminal"),
        }
    }
}

// ---------------------------------------------------------------------------
// GamePhase
// ---------------------------------------------------------------------------

/// Where the local player is in the life of a table.
///
/// ```text
/// AwaitingName → Lobby → Playing ⇄ Concluded
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    /// We need a player name before we can sit down.
    #[default]
    AwaitingName,
    /// Seated, waiting for someone to deal.
    Lobby,
    /// Cards are dealt.
    Playing,
    /// The game is over. Play intents are refused until `restart`.
    Concluded,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The client's record of one game table.
///
/// Created on the first connection attempt and kept across reconnects;
/// dropped when the user leaves the table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    /// The table identifier. `None` until the routed path or the server's
    /// `id` message provides one.
    pub session_id: Option<SessionId>,

    /// Our player name, once the user has given one.
    pub local_player: Option<String>,

    /// Current connection lifecycle phase.
    pub connection_phase: ConnectionPhase,

    /// Flips to `true` on the first `dealt` and stays there.
    pub has_game_started: bool,

    /// Current game lifecycle phase.
    pub game_phase: GamePhase,

    /// Lobby members in arrival order, no duplicates.
    pub roster: Vec<String>,
}

impl Session {
    /// Creates a session for a (possibly routed) table and a (possibly
    /// remembered) player name.
    pub fn new(session_id: Option<SessionId>, local_player: Option<String>) -> Self {
        let game_phase = if local_player.is_some() {
            GamePhase::Lobby
        } else {
            GamePhase::AwaitingName
        };
        Self {
            session_id,
            local_player,
            game_phase,
            ..Self::default()
        }
    }

    /// Returns `true` if `name` is the local player.
    pub fn is_local(&self, name: &str) -> bool {
        self.local_player.as_deref() == Some(name)
    }

    /// Returns `true` when enough players are seated for a deal.
    pub fn can_deal(&self) -> bool {
        self.roster.len() >= 2
    }

    /// Records the name the user chose and moves out of `AwaitingName`.
    pub fn with_local_player(mut self, name: impl Into<String>) -> Self {
        self.local_player = Some(name.into());
        if self.game_phase == GamePhase::AwaitingName {
            self.game_phase = GamePhase::Lobby;
        }
        self
    }

    /// Checks the local gating rules for an outbound intent.
    ///
    /// # Errors
    /// Returns [`SessionError::GameConcluded`] for play intents after the
    /// game is over.
    pub fn check_intent(&self, intent: &OutboundIntent) -> Result<(), SessionError> {
        if self.game_phase == GamePhase::Concluded && intent.is_play() {
            return Err(SessionError::GameConcluded);
        }
        Ok(())
    }

    /// Applies the local consequence of having sent `intent`.
    ///
    /// Only `restart` has one: it re-opens play after a concluded game.
    /// Everything else waits for the server to report the new state.
    pub fn after_sent(mut self, intent: &OutboundIntent) -> Self {
        if matches!(intent, OutboundIntent::Restart) && self.game_phase == GamePhase::Concluded {
            self.game_phase = GamePhase::Playing;
        }
        self
    }
}
