//! Error types for the session layer.

use fourcards_protocol::SessionId;

/// Errors raised by the local session rules.
///
/// None of these end the process. `NotFound` ends the session (the server
/// has no such table); the others only refuse a single intent.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The server does not know this table. Not retried: the user is sent
    /// back to the home page to start over.
    #[error("session {0} not found on the server")]
    NotFound(SessionId),

    /// The game has concluded. Play intents are refused until `restart`
    /// (or `stop`).
    #[error("the game has concluded")]
    GameConcluded,

    /// Joining a table needs a player name.
    #[error("a player name is required to join")]
    MissingPlayerName,
}
