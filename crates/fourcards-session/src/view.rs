//! The local mirror of the server's game state.

use std::collections::BTreeMap;

use fourcards_protocol::{CardRef, GameOverSnapshot, GameSnapshot, PlayerSummary};

/// What the client currently believes the table looks like.
///
/// The server owns the truth. A `GameView` is only ever replaced, fully or
/// in part, from inbound messages; user actions never touch it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameView {
    /// Whose turn it is. `None` before the first deal.
    pub turn_owner: Option<String>,
    pub hand: Vec<CardRef>,
    pub shown: Vec<CardRef>,
    pub playing: Option<CardRef>,
    pub deck_count: u32,
    pub players: Vec<PlayerSummary>,
    /// Top captured card per player.
    pub captured: BTreeMap<String, CardRef>,
}

impl GameView {
    /// Builds a view entirely from a snapshot.
    pub fn from_snapshot(snapshot: &GameSnapshot) -> Self {
        Self {
            turn_owner: Some(snapshot.turn.clone()),
            hand: snapshot.hand.clone(),
            shown: snapshot.shown.clone(),
            playing: snapshot.playing.clone(),
            deck_count: snapshot.deck,
            players: snapshot.players.clone(),
            captured: snapshot.captured.clone(),
        }
    }

    /// Applies a snapshot received while somebody else holds the turn.
    ///
    /// The deck count is kept from the last full update: only the turn
    /// owner's copy carries a count we trust.
    pub fn observed(&self, snapshot: &GameSnapshot) -> Self {
        Self {
            deck_count: self.deck_count,
            ..Self::from_snapshot(snapshot)
        }
    }

    /// Applies the final `game_over` state. Hand and deck are kept; the
    /// payload has neither.
    pub fn concluded(&self, snapshot: &GameOverSnapshot) -> Self {
        Self {
            turn_owner: Some(snapshot.turn.clone()),
            hand: self.hand.clone(),
            shown: snapshot.shown.clone(),
            playing: snapshot.playing.clone(),
            deck_count: self.deck_count,
            players: snapshot.players.clone(),
            captured: snapshot.captured.clone(),
        }
    }

    /// Looks up a seat by player name.
    pub fn player(&self, name: &str) -> Option<&PlayerSummary> {
        self.players.iter().find(|p| p.username == name)
    }
}

/// Which parts of the view a message refreshed, so the client re-projects
/// exactly those.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSet {
    pub hand: bool,
    pub shown: bool,
    pub captured: bool,
    pub turn: bool,
    pub deck: bool,
    pub playing: bool,
}

impl RenderSet {
    /// Everything (turn owner's update, deal).
    pub const FULL: Self = Self {
        hand: true,
        shown: true,
        captured: true,
        turn: true,
        deck: true,
        playing: true,
    };

    /// Everything but the deck count (observer's update).
    pub const OBSERVED: Self = Self {
        deck: false,
        ..Self::FULL
    };

    /// What `game_over` carries: no hand, no deck.
    pub const CONCLUDED: Self = Self {
        hand: false,
        deck: false,
        ..Self::FULL
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(turn: &str, deck: u32) -> GameSnapshot {
        GameSnapshot {
            hand: vec![CardRef::new("1c"), CardRef::new("2c")],
            shown: vec![CardRef::new("3d")],
            turn: turn.into(),
            players: vec![
                PlayerSummary {
                    username: "alice".into(),
                    captured_cards: 0,
                },
                PlayerSummary {
                    username: "bob".into(),
                    captured_cards: 3,
                },
            ],
            captured: BTreeMap::from([("bob".to_string(), CardRef::new("5b"))]),
            deck,
            playing: Some(CardRef::new("7s")),
        }
    }

    #[test]
    fn test_from_snapshot_copies_everything() {
        let view = GameView::from_snapshot(&snapshot("alice", 18));
        assert_eq!(view.turn_owner.as_deref(), Some("alice"));
        assert_eq!(view.hand, vec![CardRef::new("1c"), CardRef::new("2c")]);
        assert_eq!(view.deck_count, 18);
        assert_eq!(view.playing, Some(CardRef::new("7s")));
        assert_eq!(view.player("bob").map(|p| p.captured_cards), Some(3));
    }

    #[test]
    fn test_observed_keeps_deck_count() {
        let before = GameView::from_snapshot(&snapshot("alice", 18));
        let after = before.observed(&snapshot("bob", 11));
        assert_eq!(after.deck_count, 18);
        assert_eq!(after.turn_owner.as_deref(), Some("bob"));
    }

    #[test]
    fn test_concluded_keeps_hand_and_deck() {
        let before = GameView::from_snapshot(&snapshot("alice", 4));
        let after = before.concluded(&GameOverSnapshot {
            winner: "bob".into(),
            shown: vec![],
            turn: "bob".into(),
            players: before.players.clone(),
            captured: BTreeMap::new(),
            playing: None,
        });
        assert_eq!(after.hand, before.hand);
        assert_eq!(after.deck_count, 4);
        assert!(after.shown.is_empty());
        assert!(after.playing.is_none());
    }

    #[test]
    fn test_render_sets() {
        assert!(RenderSet::FULL.deck);
        assert!(!RenderSet::OBSERVED.deck);
        assert!(RenderSet::OBSERVED.hand);
        assert!(!RenderSet::CONCLUDED.hand);
        assert!(RenderSet::CONCLUDED.shown);
    }
}
