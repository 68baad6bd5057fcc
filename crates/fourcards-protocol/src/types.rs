//! Wire types for the four cards session protocol.
//!
//! Every message on the wire is a JSON object with a `type` discriminator
//! plus type-specific fields:
//!
//! ```text
//! { "type": "pass", "previous": "bob", "turn": "alice" }
//! ```
//!
//! Server → client messages are [`InboundMessage`]; client → server
//! messages are [`OutboundIntent`]. Both vocabularies are closed, except
//! that unknown inbound kinds decode to [`InboundMessage::Unknown`] so a
//! newer server can never crash an older client.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Identifier of one game table, shared by every player at it.
///
/// Opaque to the client: it comes either from the routed page path or from
/// the server's `id` message, and is never generated locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as sent on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a card as the server names it (the path of its face
/// image). Two refs are the same card when their identifiers are equal,
/// whatever deck style is being displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardRef(String);

impl CardRef {
    /// Wraps a raw card identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as sent on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// State payloads
// ---------------------------------------------------------------------------

/// One seat at the table, as listed in state payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    /// Player name, unique at the table.
    pub username: String,
    /// How many cards this player has captured so far.
    pub captured_cards: u32,
}

/// Game state as carried by `dealt`, `update` and `turn`.
///
/// Only the turn owner's copy is trustworthy in full; see the dispatcher
/// for how observers treat `deck`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// The receiving player's hand.
    pub hand: Vec<CardRef>,
    /// Face-up cards on the table.
    pub shown: Vec<CardRef>,
    /// Name of the player whose turn it is.
    pub turn: String,
    /// Every seat with its captured count.
    pub players: Vec<PlayerSummary>,
    /// Top captured card per player. Players with nothing captured are
    /// absent.
    #[serde(default)]
    pub captured: BTreeMap<String, CardRef>,
    /// Cards left in the deck. Observers ignore it, so it may be absent.
    #[serde(default)]
    pub deck: u32,
    /// The card currently being played, if any.
    #[serde(default)]
    pub playing: Option<CardRef>,
}

/// Final state carried by `game_over`. It has no hand and no deck count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverSnapshot {
    pub winner: String,
    pub shown: Vec<CardRef>,
    pub turn: String,
    pub players: Vec<PlayerSummary>,
    #[serde(default)]
    pub captured: BTreeMap<String, CardRef>,
    #[serde(default)]
    pub playing: Option<CardRef>,
}

// ---------------------------------------------------------------------------
// InboundMessage: server → client
// ---------------------------------------------------------------------------

/// Everything the server can send.
///
/// `#[serde(tag = "type")]` makes this an internally tagged enum, so
/// `InboundMessage::Leave { username: "bob" }` is
/// `{"type": "leave", "username": "bob"}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// A player joined the table's lobby.
    Join { username: String },

    /// A player left the table's lobby.
    Leave { username: String },

    /// The server allocated (or confirmed) the table identifier.
    Id { id: SessionId },

    /// Server software version, display only.
    #[serde(rename = "vsn")]
    ProtocolVersion { vsn: String },

    /// Cards were dealt: complete state for a new hand.
    Dealt(GameSnapshot),

    /// State after a play.
    Update(GameSnapshot),

    /// State after the turn moved on.
    Turn(GameSnapshot),

    /// The game ended.
    #[serde(alias = "gameover")]
    GameOver(GameOverSnapshot),

    /// The table identifier is unknown to the server.
    #[serde(rename = "notfound")]
    NotFound,

    /// `turn` had to draw from the deck.
    PickFromDeck { turn: String },

    /// `previous` passed; `turn` plays next.
    Pass { previous: String, turn: String },

    /// `previous` reversed the turn order.
    Reverse { previous: String },

    /// Any `type` this client does not know.
    #[serde(other)]
    Unknown,
}

impl InboundMessage {
    /// Short name of the message kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Leave { .. } => "leave",
            Self::Id { .. } => "id",
            Self::ProtocolVersion { .. } => "vsn",
            Self::Dealt(_) => "dealt",
            Self::Update(_) => "update",
            Self::Turn(_) => "turn",
            Self::GameOver(_) => "game_over",
            Self::NotFound => "notfound",
            Self::PickFromDeck { .. } => "pick_from_deck",
            Self::Pass { .. } => "pass",
            Self::Reverse { .. } => "reverse",
            Self::Unknown => "unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// OutboundIntent: client → server
// ---------------------------------------------------------------------------

/// Where a `play_to` puts the playing card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayArea {
    /// Onto one of the face-up table cards.
    Shown,
    /// Onto another player's captured pile.
    Player,
}

/// Target of a `play_to`: a 1-based table position, or a player name.
///
/// `#[serde(untagged)]` writes the inner value directly, so the wire sees
/// `"card": 2` or `"card": "bob"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlaySlot {
    Position(usize),
    Player(String),
}

/// A user action sent to the server. Fire-and-forget: the server answers,
/// if at all, with a later `update`/`turn`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundIntent {
    /// Ask the server to allocate a new table.
    Create,

    /// Take a seat. `name` is the table identifier.
    Join { name: SessionId, username: String },

    /// Deal the cards (needs at least two players in the lobby).
    Deal,

    /// Play the card at a 1-based hand position.
    PlayFrom { card: usize },

    /// Place the playing card somewhere on the table.
    PlayTo {
        #[serde(rename = "where")]
        area: PlayArea,
        card: PlaySlot,
    },

    /// Give up this turn.
    Pass,

    /// Keep-alive.
    #[serde(rename = "ping")]
    Heartbeat,

    /// Cosmetic: the card-back style this player uses.
    DeckStyle { name: String },

    /// End the game for everybody.
    Stop,

    /// Start another game at the same table.
    Restart,
}

impl OutboundIntent {
    /// Returns `true` for intents that act on a running game and are
    /// meaningless once it has concluded.
    pub fn is_play(&self) -> bool {
        matches!(
            self,
            Self::Deal | Self::PlayFrom { .. } | Self::PlayTo { .. } | Self::Pass
        )
    }

    /// Short name of the intent, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Join { .. } => "join",
            Self::Deal => "deal",
            Self::PlayFrom { .. } => "play_from",
            Self::PlayTo { .. } => "play_to",
            Self::Pass => "pass",
            Self::Heartbeat => "ping",
            Self::DeckStyle { .. } => "deck_style",
            Self::Stop => "stop",
            Self::Restart => "restart",
        }
    }
}

/// A card the user clicked, identified by where it sits.
///
/// Hand and table positions are 1-based, matching what is displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardSelection {
    /// A card in the local player's hand.
    Hand(usize),
    /// A face-up table card.
    Shown(usize),
    /// Another player's captured pile.
    Player(String),
}

impl From<CardSelection> for OutboundIntent {
    fn from(selection: CardSelection) -> Self {
        match selection {
            CardSelection::Hand(position) => Self::PlayFrom { card: position },
            CardSelection::Shown(position) => Self::PlayTo {
                area: PlayArea::Shown,
                card: PlaySlot::Position(position),
            },
            CardSelection::Player(name) => Self::PlayTo {
                area: PlayArea::Player,
                card: PlaySlot::Player(name),
            },
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
