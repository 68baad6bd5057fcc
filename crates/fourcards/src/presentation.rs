//! The presentation boundary.
//!
//! The client never renders anything itself. After every state change it
//! calls the projection methods below with the new data, and it reports
//! lifecycle events through the `notify_*` methods. It never reads anything
//! back, so an implementation can be a DOM bridge, a terminal UI, or a test
//! recorder.

use std::collections::BTreeMap;

use fourcards_protocol::{CardRef, PlayerSummary, SessionId};
use fourcards_session::NarrationEntry;

/// Receives projections of the session and lifecycle notifications.
///
/// Called only from the client task, one call at a time.
pub trait Presentation: Send + 'static {
    // -- Projections --

    /// The local player's hand, in display order.
    fn project_hand(&mut self, cards: &[CardRef]);

    /// The face-up table cards, in display order.
    fn project_shown(&mut self, cards: &[CardRef]);

    /// Every seat with its captured count and top captured card.
    fn project_captured(&mut self, players: &[PlayerSummary], captured: &BTreeMap<String, CardRef>);

    /// Whose turn it is.
    fn project_turn(&mut self, turn_owner: Option<&str>);

    /// Cards left in the deck.
    fn project_deck_count(&mut self, count: u32);

    /// The card being played, or `None` for the card back.
    fn project_playing_card(&mut self, card: Option<&CardRef>);

    /// A new narration entry, to be shown above the older ones.
    fn project_narration(&mut self, entry: &NarrationEntry);

    /// Removes every displayed narration entry.
    fn clear_narration(&mut self);

    /// The server version string.
    fn project_protocol_version(&mut self, _version: &str) {}

    // -- Lifecycle --

    /// The connection is (back) up. Clear any "disconnected" banner.
    fn notify_connected(&mut self) {}

    /// The connection dropped. `will_retry` is `false` only for a terminal
    /// close.
    fn notify_disconnected(&mut self, will_retry: bool);

    /// Lobby membership changed. `can_deal` gates the deal control.
    fn notify_roster_changed(&mut self, roster: &[String], can_deal: bool);

    /// A player name is needed before joining.
    fn notify_awaiting_player_name(&mut self) {}

    /// The first deal happened.
    fn notify_game_start(&mut self);

    /// The game ended.
    fn notify_game_over(&mut self, is_winner: bool, winner: &str);

    /// Navigate to the home page (unrouted address).
    fn notify_redirect_home(&mut self);

    /// Record the table in the page address so reloads and reconnects
    /// target the same table.
    fn persist_session(&mut self, _session_id: &SessionId) {}
}
