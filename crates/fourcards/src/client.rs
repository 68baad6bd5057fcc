//! The session client: connection manager and dispatch loop.
//!
//! [`SessionClient::connect`] spawns one Tokio task (the actor) that owns
//! the transport, the [`Session`], the [`GameView`] and the narration log.
//! Everything that touches them happens inside that task, one event at a
//! time: an inbound frame, a command from a [`ClientHandle`], or a timer.
//!
//! ```text
//!            ┌──────────── retry delay ─────────────┐
//!            ▼                                      │
//! Idle → Connecting ──→ Connected ──(failure)──→ DisconnectedRetrying
//!            │              │
//!            └──(close)─────┴──(close / leave / notfound)──→ DisconnectedTerminal
//! ```

use fourcards_protocol::{
    CardSelection, Codec, JsonCodec, OutboundIntent, SessionId, decode_inbound, encode_intent,
};
use fourcards_session::{
    ConnectionPhase, Dispatch, Effect, GameView, NarrationEntry, NarrationLog, RenderSet, Session,
    SessionError, dispatch,
};
use fourcards_transport::{Connection, Connector, TransportError};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior};

use crate::{ClientConfig, ClientError, Presentation};

// ---------------------------------------------------------------------------
// Public handle
// ---------------------------------------------------------------------------

/// A read-only copy of the client's state at one point in time.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session: Session,
    pub view: GameView,
    /// Narration, newest first.
    pub narration: Vec<NarrationEntry>,
}

/// Commands sent from handles to the client task.
enum ClientCommand {
    Send {
        intent: OutboundIntent,
        reply: oneshot::Sender<Result<(), ClientError>>,
    },
    Join {
        name: String,
        reply: oneshot::Sender<Result<(), ClientError>>,
    },
    Leave {
        reply: oneshot::Sender<()>,
    },
    Close {
        reply: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

/// Handle to a running session client.
///
/// Cheap to clone. When every handle is dropped the client closes the
/// connection for good.
#[derive(Clone)]
pub struct ClientHandle {
    commands: mpsc::Sender<ClientCommand>,
    phase: watch::Receiver<ConnectionPhase>,
}

impl ClientHandle {
    /// Sends an intent to the server (fire-and-forget).
    ///
    /// # Errors
    /// - [`ClientError::NotConnected`]: the connection is not up; the
    ///   intent is dropped.
    /// - [`ClientError::Session`] with [`SessionError::GameConcluded`]: a
    ///   play intent after the game ended.
    /// - [`ClientError::Transport`]: the write itself failed.
    ///
    /// A `join` intent behaves like [`ClientHandle::join`] on the named
    /// table: the name is remembered and re-issued on reconnect.
    pub async fn send(&self, intent: OutboundIntent) -> Result<(), ClientError> {
        self.request(|reply| ClientCommand::Send { intent, reply }).await?
    }

    /// Takes a seat at the table under `name`.
    ///
    /// The name is remembered even when this returns
    /// [`ClientError::NotConnected`]: the join is re-issued on every
    /// (re)connect.
    pub async fn join(&self, name: impl Into<String>) -> Result<(), ClientError> {
        let name = name.into();
        self.request(|reply| ClientCommand::Join { name, reply }).await?
    }

    /// Asks the server to deal.
    pub async fn deal(&self) -> Result<(), ClientError> {
        self.send(OutboundIntent::Deal).await
    }

    /// Plays the selected card.
    pub async fn play(&self, selection: CardSelection) -> Result<(), ClientError> {
        self.send(selection.into()).await
    }

    /// Passes this turn.
    pub async fn pass(&self) -> Result<(), ClientError> {
        self.send(OutboundIntent::Pass).await
    }

    /// Starts another game at the same table.
    pub async fn restart(&self) -> Result<(), ClientError> {
        self.send(OutboundIntent::Restart).await
    }

    /// Tells the server which card-back style this player uses.
    pub async fn deck_style(&self, name: impl Into<String>) -> Result<(), ClientError> {
        self.send(OutboundIntent::DeckStyle { name: name.into() }).await
    }

    /// Stops the game, forgets the table and redirects home. Terminal.
    pub async fn leave(&self) -> Result<(), ClientError> {
        self.request(|reply| ClientCommand::Leave { reply }).await?;
        self.wait_for_phase(ConnectionPhase::DisconnectedTerminal).await
    }

    /// Closes the connection for good. No reconnect follows.
    pub async fn close(&self) -> Result<(), ClientError> {
        self.request(|reply| ClientCommand::Close { reply }).await?;
        self.wait_for_phase(ConnectionPhase::DisconnectedTerminal).await
    }

    /// Returns a copy of the current session, view and narration.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, ClientError> {
        self.request(|reply| ClientCommand::Snapshot { reply }).await
    }

    /// Returns the current connection phase.
    pub fn phase(&self) -> ConnectionPhase {
        *self.phase.borrow()
    }

    /// Waits until the connection reaches `target`.
    pub async fn wait_for_phase(&self, target: ConnectionPhase) -> Result<(), ClientError> {
        let mut phase = self.phase.clone();
        phase
            .wait_for(|current| *current == target)
            .await
            .map(|_| ())
            .map_err(|_| ClientError::Shutdown)
    }

    /// Sends a command and waits for its reply.
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> ClientCommand,
    ) -> Result<T, ClientError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(make(reply_tx))
            .await
            .map_err(|_| ClientError::Shutdown)?;
        reply_rx.await.map_err(|_| ClientError::Shutdown)
    }
}

// ---------------------------------------------------------------------------
// SessionClient
// ---------------------------------------------------------------------------

/// Entry point: starts a session client task.
pub struct SessionClient;

impl SessionClient {
    /// Starts a client speaking JSON over `connector`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect<C, P>(config: ClientConfig, connector: C, presentation: P) -> ClientHandle
    where
        C: Connector,
        P: Presentation,
    {
        Self::connect_with_codec(config, connector, presentation, JsonCodec)
    }

    /// Starts a client with an explicit codec.
    pub fn connect_with_codec<C, P, K>(
        config: ClientConfig,
        connector: C,
        presentation: P,
        codec: K,
    ) -> ClientHandle
    where
        C: Connector,
        P: Presentation,
        K: Codec,
    {
        let config = config.validated();
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer);
        let (phase_tx, phase_rx) = watch::channel(ConnectionPhase::Idle);

        let narration = match config.narration_capacity {
            Some(capacity) => NarrationLog::bounded(capacity),
            None => NarrationLog::new(),
        };
        let table = TableState {
            session: Session::new(config.session_id.clone(), config.player_name.clone()),
            view: GameView::default(),
            narration,
        };

        let actor = ClientActor {
            config,
            connector,
            presentation,
            codec,
            table,
            commands: command_rx,
            phase: phase_tx,
        };
        tokio::spawn(actor.run());

        ClientHandle {
            commands: command_tx,
            phase: phase_rx,
        }
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// Why the client left the `Connected` (or `Connecting`) phase.
#[derive(Debug)]
enum Exit {
    /// Transport failure. Retry after the delay.
    Failed(ClientError),
    /// The user closed the client.
    Closed,
    /// The user left the table.
    Left,
    /// The server does not know the table.
    NotFound,
}

/// The state the dispatcher reads and replaces.
struct TableState {
    session: Session,
    view: GameView,
    narration: NarrationLog,
}

impl TableState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session: self.session.clone(),
            view: self.view.clone(),
            narration: self.narration.newest_first().cloned().collect(),
        }
    }
}

struct ClientActor<C: Connector, P: Presentation, K: Codec> {
    config: ClientConfig,
    connector: C,
    presentation: P,
    codec: K,
    table: TableState,
    commands: mpsc::Receiver<ClientCommand>,
    phase: watch::Sender<ConnectionPhase>,
}

impl<C, P, K> ClientActor<C, P, K>
where
    C: Connector,
    P: Presentation,
    K: Codec,
{
    /// Connects, serves, and reconnects until something terminal happens,
    /// then keeps answering handles until they are all dropped.
    async fn run(mut self) {
        tracing::info!(endpoint = %self.config.endpoint, "session client started");

        let exit = loop {
            self.set_phase(ConnectionPhase::Connecting);

            let endpoint = self.config.endpoint.clone();
            let attempt = tokio::select! {
                result = self.connector.connect(&endpoint) => result,
                exit = next_offline_exit(&mut self.commands, &mut self.table) => {
                    break exit;
                }
            };

            let failure = match attempt {
                Ok(conn) => match self.serve(conn).await {
                    Exit::Failed(e) => e,
                    exit => break exit,
                },
                Err(e) => e.into(),
            };

            self.set_phase(ConnectionPhase::DisconnectedRetrying);
            tracing::info!(
                error = %failure,
                delay = ?self.config.reconnect_delay,
                "disconnected, will retry"
            );
            self.presentation.notify_disconnected(true);

            tokio::select! {
                _ = tokio::time::sleep(self.config.reconnect_delay) => {}
                exit = next_offline_exit(&mut self.commands, &mut self.table) => {
                    break exit;
                }
            }
        };

        self.finish(exit);

        // Terminal: answer what we still can until every handle is gone.
        while let Some(cmd) = self.commands.recv().await {
            if let Some(Exit::Left) = handle_offline(&mut self.table, cmd) {
                self.forget_table();
            }
        }
        tracing::debug!("session client task finished");
    }

    /// Runs one established connection until it fails or is ended.
    async fn serve(&mut self, conn: C::Connection) -> Exit {
        let conn_id = conn.id();
        self.set_phase(ConnectionPhase::Connected);
        self.presentation.notify_connected();
        tracing::info!(
            %conn_id,
            session_id = ?self.table.session.session_id,
            "connected"
        );

        if let Err(e) = self.on_open(&conn).await {
            return Exit::Failed(e);
        }

        // First beat one period after connecting, then every period.
        let period = self.config.heartbeat_interval;
        let mut heartbeat = tokio::time::interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let exit = loop {
            tokio::select! {
                frame = conn.recv() => match frame {
                    Ok(Some(data)) => {
                        if let Some(exit) = self.on_frame(&conn, &data).await {
                            break exit;
                        }
                    }
                    Ok(None) => {
                        break Exit::Failed(
                            TransportError::ConnectionClosed("closed by server".into()).into(),
                        );
                    }
                    Err(e) => break Exit::Failed(e.into()),
                },
                cmd = self.commands.recv() => match cmd {
                    Some(cmd) => {
                        if let Some(exit) = self.on_command(&conn, cmd).await {
                            break exit;
                        }
                    }
                    None => break Exit::Closed,
                },
                _ = heartbeat.tick() => {
                    let beat = transmit(&self.codec, &conn, &OutboundIntent::Heartbeat).await;
                    if let Err(e) = beat {
                        tracing::warn!(%conn_id, error = %e, "heartbeat failed");
                    }
                }
            }
        };

        if !matches!(exit, Exit::Failed(_)) {
            if let Err(e) = conn.close().await {
                tracing::debug!(%conn_id, error = %e, "close failed");
            }
        }
        exit
    }

    /// Announces ourselves on a fresh connection.
    async fn on_open(&mut self, conn: &C::Connection) -> Result<(), ClientError> {
        match self.table.session.session_id.clone() {
            Some(id) => self.presentation.persist_session(&id),
            None => transmit(&self.codec, conn, &OutboundIntent::Create).await?,
        }

        let session = &self.table.session;
        match (session.session_id.clone(), session.local_player.clone()) {
            (Some(id), Some(username)) => {
                // The server re-announces everyone after a join.
                self.table.session.roster.clear();
                self.presentation.notify_roster_changed(&[], false);
                transmit(&self.codec, conn, &OutboundIntent::Join { name: id, username })
                    .await?;
            }
            (_, None) => self.presentation.notify_awaiting_player_name(),
            (None, Some(_)) => {}
        }
        Ok(())
    }

    /// Decodes and dispatches one inbound frame.
    async fn on_frame(&mut self, conn: &C::Connection, data: &[u8]) -> Option<Exit> {
        let msg = match decode_inbound(&self.codec, data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(error = %e, "dropping malformed frame");
                return None;
            }
        };
        tracing::debug!(kind = msg.kind(), "inbound message");

        let result = dispatch(&msg, &self.table.session, &self.table.view);
        let wants_name = result.effects.contains(&Effect::AwaitPlayerName);
        let exit = self.apply(result);

        // A freshly allocated table with a name already known: join right away.
        if wants_name {
            if let Some(name) = self.table.session.local_player.clone() {
                if let Err(e) = self.join(conn, name).await {
                    tracing::warn!(error = %e, "automatic join failed");
                }
            }
        }
        exit
    }

    /// Replaces state, runs effects, then appends narration.
    fn apply(&mut self, result: Dispatch) -> Option<Exit> {
        let Dispatch {
            session,
            view,
            narration,
            effects,
        } = result;
        self.table.session = session;
        self.table.view = view;

        let mut exit = None;
        for effect in effects {
            match effect {
                Effect::RosterChanged => {
                    let session = &self.table.session;
                    self.presentation
                        .notify_roster_changed(&session.roster, session.can_deal());
                }
                Effect::PersistSession(id) => self.presentation.persist_session(&id),
                Effect::AwaitPlayerName => {
                    if self.table.session.local_player.is_none() {
                        self.presentation.notify_awaiting_player_name();
                    }
                }
                Effect::ShowVersion(version) => {
                    self.presentation.project_protocol_version(&version);
                }
                Effect::ClearNarration => {
                    self.table.narration.clear();
                    self.presentation.clear_narration();
                }
                Effect::GameStarted => self.presentation.notify_game_start(),
                Effect::Render(set) => self.project(set),
                Effect::GameOver { is_winner, winner } => {
                    self.presentation.notify_game_over(is_winner, &winner);
                }
                Effect::RedirectHome => {
                    self.presentation.notify_redirect_home();
                    exit = Some(Exit::NotFound);
                }
            }
        }

        for line in narration {
            let entry = self.table.narration.append(line);
            self.presentation.project_narration(entry);
        }
        exit
    }

    /// Pushes the selected parts of the view to the presentation.
    fn project(&mut self, set: RenderSet) {
        let view = &self.table.view;
        if set.turn {
            self.presentation.project_turn(view.turn_owner.as_deref());
        }
        if set.captured {
            self.presentation
                .project_captured(&view.players, &view.captured);
        }
        if set.shown {
            self.presentation.project_shown(&view.shown);
        }
        if set.hand {
            self.presentation.project_hand(&view.hand);
        }
        if set.deck {
            self.presentation.project_deck_count(view.deck_count);
        }
        if set.playing {
            self.presentation.project_playing_card(view.playing.as_ref());
        }
    }

    /// Handles a command while connected.
    async fn on_command(&mut self, conn: &C::Connection, cmd: ClientCommand) -> Option<Exit> {
        match cmd {
            ClientCommand::Send { intent, reply } => {
                let result = self.send_intent(conn, intent).await;
                let _ = reply.send(result);
                None
            }
            ClientCommand::Join { name, reply } => {
                let result = self.join(conn, name).await;
                let _ = reply.send(result);
                None
            }
            ClientCommand::Leave { reply } => {
                if let Err(e) = transmit(&self.codec, conn, &OutboundIntent::Stop).await {
                    tracing::warn!(error = %e, "could not send stop while leaving");
                }
                let _ = reply.send(());
                Some(Exit::Left)
            }
            ClientCommand::Close { reply } => {
                let _ = reply.send(());
                Some(Exit::Closed)
            }
            ClientCommand::Snapshot { reply } => {
                let _ = reply.send(self.table.snapshot());
                None
            }
        }
    }

    async fn send_intent(
        &mut self,
        conn: &C::Connection,
        intent: OutboundIntent,
    ) -> Result<(), ClientError> {
        if let OutboundIntent::Join { name, username } = intent {
            let username = adopt_join(&mut self.table, name, username)?;
            return self.join(conn, username).await;
        }
        if let Err(e) = self.table.session.check_intent(&intent) {
            tracing::warn!(kind = intent.kind(), error = %e, "dropping intent");
            return Err(e.into());
        }
        transmit(&self.codec, conn, &intent).await?;
        self.table.session = self.table.session.clone().after_sent(&intent);
        Ok(())
    }

    async fn join(&mut self, conn: &C::Connection, name: String) -> Result<(), ClientError> {
        let name = accept_name(&mut self.table, name)?;
        match self.table.session.session_id.clone() {
            Some(id) => {
                transmit(
                    &self.codec,
                    conn,
                    &OutboundIntent::Join {
                        name: id,
                        username: name,
                    },
                )
                .await
            }
            None => {
                // Sent as soon as the server assigns the table id.
                tracing::debug!(username = %name, "no session id yet, join deferred");
                Ok(())
            }
        }
    }

    fn set_phase(&mut self, next: ConnectionPhase) {
        let current = self.table.session.connection_phase;
        if !current.can_transition_to(next) {
            tracing::warn!(from = %current, to = %next, "unexpected connection phase change");
        }
        self.table.session.connection_phase = next;
        self.phase.send_replace(next);
    }

    /// Destroys the session and sends the user home. The phase stays
    /// terminal.
    fn forget_table(&mut self) {
        tracing::info!(session_id = ?self.table.session.session_id, "left the table");
        let mut fresh = Session::new(None, None);
        fresh.connection_phase = ConnectionPhase::DisconnectedTerminal;
        self.table.session = fresh;
        self.table.view = GameView::default();
        self.table.narration.clear();
        self.presentation.notify_redirect_home();
    }

    /// Applies a terminal exit.
    fn finish(&mut self, exit: Exit) {
        self.set_phase(ConnectionPhase::DisconnectedTerminal);
        match exit {
            Exit::Closed => {
                tracing::info!("session closed");
                self.presentation.notify_disconnected(false);
            }
            Exit::Left => self.forget_table(),
            Exit::NotFound => {
                if let Some(id) = self.table.session.session_id.clone() {
                    let err = SessionError::NotFound(id);
                    tracing::info!(error = %err, "redirecting home");
                }
            }
            Exit::Failed(e) => {
                // Only reachable if a failure is ever made terminal.
                tracing::warn!(error = %e, "session ended after failure");
                self.presentation.notify_disconnected(false);
            }
        }
    }
}

/// Encodes and writes one intent.
async fn transmit<K: Codec, T: Connection>(
    codec: &K,
    conn: &T,
    intent: &OutboundIntent,
) -> Result<(), ClientError> {
    let bytes = encode_intent(codec, intent)?;
    tracing::debug!(conn_id = %conn.id(), kind = intent.kind(), "sending intent");
    conn.send(&bytes).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Offline command handling
// ---------------------------------------------------------------------------

/// Validates and records the player name.
fn accept_name(table: &mut TableState, name: String) -> Result<String, ClientError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(SessionError::MissingPlayerName.into());
    }
    table.session = table.session.clone().with_local_player(name.clone());
    Ok(name)
}

/// Takes the table a raw `join` intent names and records the player name.
fn adopt_join(
    table: &mut TableState,
    name: SessionId,
    username: String,
) -> Result<String, ClientError> {
    let username = accept_name(table, username)?;
    table.session.session_id = Some(name);
    Ok(username)
}

/// Handles a command while not connected. Returns an exit for commands
/// that end the session.
fn handle_offline(table: &mut TableState, cmd: ClientCommand) -> Option<Exit> {
    match cmd {
        ClientCommand::Send {
            intent: OutboundIntent::Join { name, username },
            reply,
        } => {
            let result = adopt_join(table, name, username).and(Err(ClientError::NotConnected));
            let _ = reply.send(result);
            None
        }
        ClientCommand::Send { intent, reply } => {
            tracing::warn!(
                kind = intent.kind(),
                phase = %table.session.connection_phase,
                "dropping intent: not connected"
            );
            let _ = reply.send(Err(ClientError::NotConnected));
            None
        }
        ClientCommand::Join { name, reply } => {
            let result = accept_name(table, name).and(Err(ClientError::NotConnected));
            let _ = reply.send(result);
            None
        }
        ClientCommand::Leave { reply } => {
            let _ = reply.send(());
            Some(Exit::Left)
        }
        ClientCommand::Close { reply } => {
            let _ = reply.send(());
            Some(Exit::Closed)
        }
        ClientCommand::Snapshot { reply } => {
            let _ = reply.send(table.snapshot());
            None
        }
    }
}

/// Serves commands until one ends the session (or every handle is gone).
///
/// Cancel-safe: raced against connect attempts and the retry delay.
async fn next_offline_exit(
    commands: &mut mpsc::Receiver<ClientCommand>,
    table: &mut TableState,
) -> Exit {
    while let Some(cmd) = commands.recv().await {
        if let Some(exit) = handle_offline(table, cmd) {
            return exit;
        }
    }
    Exit::Closed
}
