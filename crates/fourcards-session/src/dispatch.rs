//! The event dispatcher: one inbound message in, new state out.
//!
//! [`dispatch`] is a pure function of the current [`Session`], the current
//! [`GameView`] and the message. It returns the next session and view, the
//! narration to append and the presentation [`Effect`]s to run. Nothing is
//! mutated in place, so every rule here can be tested without a socket.
//!
//! The callers apply a [`Dispatch`] in this order: replace state, run the
//! effects in order, then append the narration. That way a
//! [`Effect::ClearNarration`] never swallows the entry its own message
//! produced.

use fourcards_protocol::{InboundMessage, SessionId};

use crate::narration::{Narration, narrate};
use crate::view::{GameView, RenderSet};
use crate::{GamePhase, Session};

/// A presentation-side consequence of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Lobby membership changed; re-project the roster and the deal gate.
    RosterChanged,
    /// The table identifier is known; remember it in the page address.
    PersistSession(SessionId),
    /// Ask the user for a player name.
    AwaitPlayerName,
    /// Show the server version.
    ShowVersion(String),
    /// Wipe the displayed narration.
    ClearNarration,
    /// The first deal happened.
    GameStarted,
    /// Re-project these parts of the view.
    Render(RenderSet),
    /// The game ended.
    GameOver { is_winner: bool, winner: String },
    /// The table does not exist; go back to the home page.
    RedirectHome,
}

/// Everything one message produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub session: Session,
    pub view: GameView,
    pub narration: Vec<Narration>,
    pub effects: Vec<Effect>,
}

/// Routes `msg` to its state update and narration.
pub fn dispatch(msg: &InboundMessage, session: &Session, view: &GameView) -> Dispatch {
    // Narration reads the session as it was before this message.
    let narration: Vec<Narration> = narrate(msg, session).into_iter().collect();

    let mut next_session = session.clone();
    let mut next_view = view.clone();
    let mut effects = Vec::new();

    match msg {
        InboundMessage::Join { username } => {
            if !next_session.roster.iter().any(|name| name == username) {
                next_session.roster.push(username.clone());
            }
            effects.push(Effect::RosterChanged);
        }

        InboundMessage::Leave { username } => {
            next_session.roster.retain(|name| name != username);
            effects.push(Effect::RosterChanged);
        }

        InboundMessage::Id { id } => {
            next_session.session_id = Some(id.clone());
            next_session.game_phase = GamePhase::AwaitingName;
            effects.push(Effect::PersistSession(id.clone()));
            effects.push(Effect::AwaitPlayerName);
        }

        InboundMessage::ProtocolVersion { vsn } => {
            effects.push(Effect::ShowVersion(vsn.clone()));
        }

        InboundMessage::Dealt(snapshot) => {
            if !session.has_game_started {
                next_session.has_game_started = true;
                effects.push(Effect::ClearNarration);
                effects.push(Effect::GameStarted);
            }
            next_session.game_phase = GamePhase::Playing;
            next_view = GameView::from_snapshot(snapshot);
            effects.push(Effect::Render(RenderSet::FULL));
        }

        // The server sends the complete state only to the player whose
        // turn it is; everyone else keeps the deck count of their own last
        // full update.
        InboundMessage::Update(snapshot) | InboundMessage::Turn(snapshot) => {
            if session.is_local(&snapshot.turn) {
                next_view = GameView::from_snapshot(snapshot);
                effects.push(Effect::Render(RenderSet::FULL));
            } else {
                next_view = view.observed(snapshot);
                effects.push(Effect::Render(RenderSet::OBSERVED));
            }
        }

        InboundMessage::GameOver(over) => {
            next_session.game_phase = GamePhase::Concluded;
            next_view = view.concluded(over);
            effects.push(Effect::Render(RenderSet::CONCLUDED));
            effects.push(Effect::GameOver {
                is_winner: session.is_local(&over.winner),
                winner: over.winner.clone(),
            });
        }

        InboundMessage::NotFound => {
            effects.push(Effect::RedirectHome);
        }

        InboundMessage::PickFromDeck { .. }
        | InboundMessage::Pass { .. }
        | InboundMessage::Reverse { .. }
        | InboundMessage::Unknown => {}
    }

    Dispatch {
        session: next_session,
        view: next_view,
        narration,
        effects,
    }
}
