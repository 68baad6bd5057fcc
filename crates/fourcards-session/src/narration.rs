//! Narration: the human-readable log of notable table events.
//!
//! Narration is derived from inbound messages and never feeds back into
//! state. [`narrate`] decides what (if anything) a message says;
//! [`NarrationLog`] stamps and keeps the entries.

use std::collections::VecDeque;

use fourcards_protocol::InboundMessage;

use crate::Session;

/// How an entry should be highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Success,
}

/// An entry not yet stamped with a sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narration {
    pub text: String,
    pub severity: Severity,
}

impl Narration {
    fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }
}

/// One immutable line of the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationEntry {
    pub text: String,
    pub severity: Severity,
    /// Strictly increasing over the life of the log, `clear` included.
    pub sequence: u64,
}

/// Append-only, optionally bounded, log of narration entries.
#[derive(Debug, Clone, Default)]
pub struct NarrationLog {
    entries: VecDeque<NarrationEntry>,
    last_sequence: u64,
    capacity: Option<usize>,
}

impl NarrationLog {
    /// Creates an unbounded log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a log that keeps at most `capacity` entries, evicting the
    /// oldest. A capacity of 0 is treated as 1.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity.max(1)),
            ..Self::default()
        }
    }

    /// Stamps `narration` with the next sequence number and appends it.
    pub fn append(&mut self, narration: Narration) -> &NarrationEntry {
        self.last_sequence += 1;
        if let Some(capacity) = self.capacity {
            while self.entries.len() >= capacity {
                self.entries.pop_front();
            }
        }
        self.entries.push_back(NarrationEntry {
            text: narration.text,
            severity: narration.severity,
            sequence: self.last_sequence,
        });
        self.entries.back().expect("just pushed")
    }

    /// Drops every entry. Sequence numbers keep counting.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries for display, newest first.
    pub fn newest_first(&self) -> impl Iterator<Item = &NarrationEntry> {
        self.entries.iter().rev()
    }

    /// Entries in the order they were appended.
    pub fn oldest_first(&self) -> impl Iterator<Item = &NarrationEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Derives the narration for `msg`, reading (never writing) the session as
/// it was before the message is dispatched.
///
/// Kinds not listed here say nothing.
pub fn narrate(msg: &InboundMessage, session: &Session) -> Option<Narration> {
    match msg {
        InboundMessage::Dealt(_) if !session.has_game_started => {
            Some(Narration::new(Severity::Info, "the game has started!"))
        }
        InboundMessage::PickFromDeck { turn } => Some(Narration::new(
            Severity::Warn,
            format!("oh! {turn} had to draw a card from the deck!"),
        )),
        InboundMessage::GameOver(over) => Some(if session.is_local(&over.winner) {
            Narration::new(Severity::Success, "you beat your opponents! well done!")
        } else {
            Narration::new(
                Severity::Warn,
                format!("better luck next time, {} wins!", over.winner),
            )
        }),
        InboundMessage::Pass { previous, turn } => Some(if session.is_local(previous) {
            Narration::new(
                Severity::Info,
                "no worries, you'll have a use for your cards next time!",
            )
        } else if session.is_local(turn) {
            Narration::new(
                Severity::Success,
                format!("you have an opportunity! {previous} passed!"),
            )
        } else {
            Narration::new(
                Severity::Info,
                format!("sadly {previous} couldn't use any card!"),
            )
        }),
        InboundMessage::Reverse { previous } => Some(Narration::new(
            Severity::Warn,
            format!("{previous} reversed the turn order! what a mess!"),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(text: &str) -> Narration {
        Narration::new(Severity::Info, text)
    }

    #[test]
    fn test_sequence_strictly_increases() {
        let mut log = NarrationLog::new();
        let a = log.append(info("a")).sequence;
        let b = log.append(info("b")).sequence;
        let c = log.append(info("b")).sequence;
        assert!(a < b && b < c);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_newest_first_reverses_append_order() {
        let mut log = NarrationLog::new();
        log.append(info("first"));
        log.append(info("second"));
        let texts: Vec<_> = log.newest_first().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["second", "first"]);
    }

    #[test]
    fn test_clear_keeps_counting() {
        let mut log = NarrationLog::new();
        log.append(info("a"));
        log.append(info("b"));
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.append(info("c")).sequence, 3);
    }

    #[test]
    fn test_bounded_log_evicts_oldest() {
        let mut log = NarrationLog::bounded(2);
        log.append(info("a"));
        log.append(info("b"));
        log.append(info("c"));
        let texts: Vec<_> = log.oldest_first().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["b", "c"]);
        assert_eq!(log.newest_first().next().map(|e| e.sequence), Some(3));
    }

    #[test]
    fn test_pass_phrasing_depends_on_who_we_are() {
        let msg = InboundMessage::Pass {
            previous: "bob".into(),
            turn: "alice".into(),
        };

        let as_alice = narrate(&msg, &Session::new(None, Some("alice".into()))).unwrap();
        assert_eq!(as_alice.severity, Severity::Success);
        assert!(as_alice.text.contains("opportunity"));
        assert!(as_alice.text.contains("bob"));

        let as_bob = narrate(&msg, &Session::new(None, Some("bob".into()))).unwrap();
        assert!(as_bob.text.contains("you'll have a use"));

        let as_carol = narrate(&msg, &Session::new(None, Some("carol".into()))).unwrap();
        assert!(as_carol.text.starts_with("sadly bob"));
    }

    #[test]
    fn test_reverse_and_pick_name_the_player() {
        let session = Session::new(None, Some("alice".into()));
        let reverse = narrate(
            &InboundMessage::Reverse {
                previous: "bob".into(),
            },
            &session,
        )
        .unwrap();
        assert!(reverse.text.starts_with("bob reversed"));

        let pick = InboundMessage::PickFromDeck {
            turn: "carol".into(),
        };
        let pick = narrate(&pick, &session).unwrap();
        assert!(pick.text.contains("carol"));
    }

    #[test]
    fn test_silent_kinds_say_nothing() {
        let session = Session::new(None, Some("alice".into()));
        assert!(narrate(&InboundMessage::Unknown, &session).is_none());
        assert!(narrate(&InboundMessage::NotFound, &session).is_none());
        assert!(
            narrate(
                &InboundMessage::Join {
                    username: "bob".into()
                },
                &session
            )
            .is_none()
        );
    }
}
