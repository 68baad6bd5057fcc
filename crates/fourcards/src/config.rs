//! Client configuration.

use std::time::Duration;

use fourcards_protocol::SessionId;

use crate::ClientError;
use crate::routing;

/// Configuration for one [`SessionClient`](crate::SessionClient).
///
/// Start from [`ClientConfig::from_page_url`] (or [`ClientConfig::new`])
/// and override what you need with the `with_*` methods.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// The WebSocket endpoint, e.g. `ws://host:4000/websession`.
    pub endpoint: String,

    /// Table to resume. `None` asks the server to allocate one.
    pub session_id: Option<SessionId>,

    /// Player name to join with, if already known (a returning player).
    pub player_name: Option<String>,

    /// How often to send a heartbeat while connected.
    ///
    /// Default: 10 seconds. Clamped to at least
    /// [`Self::MIN_HEARTBEAT_INTERVAL`].
    pub heartbeat_interval: Duration,

    /// Constant wait before each reconnect attempt.
    ///
    /// Default: 1 second. There is no exponential growth.
    pub reconnect_delay: Duration,

    /// Maximum narration entries kept. `None` keeps everything.
    pub narration_capacity: Option<usize>,

    /// Capacity of the command channel between handles and the client
    /// task. Default: 64, minimum 1.
    pub command_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: format!("ws://127.0.0.1:4000{}", routing::WEBSOCKET_PATH),
            session_id: None,
            player_name: None,
            heartbeat_interval: Self::DEFAULT_HEARTBEAT_INTERVAL,
            reconnect_delay: Self::DEFAULT_RECONNECT_DELAY,
            narration_capacity: None,
            command_buffer: 64,
        }
    }
}

impl ClientConfig {
    pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);
    pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);
    pub const MIN_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(100);

    /// Creates a config for an explicit endpoint with default timings.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Derives endpoint and routed table from a page address such as
    /// `https://host/k3x9`.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidUrl`] if the address is not a web
    /// address with a host.
    pub fn from_page_url(page_url: &str) -> Result<Self, ClientError> {
        let route = routing::route(page_url)?;
        Ok(Self {
            endpoint: route.endpoint,
            session_id: route.session_id,
            ..Default::default()
        })
    }

    #[must_use]
    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    #[must_use]
    pub fn with_player_name(mut self, name: impl Into<String>) -> Self {
        self.player_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    #[must_use]
    pub fn with_narration_capacity(mut self, capacity: usize) -> Self {
        self.narration_capacity = Some(capacity);
        self
    }

    /// Clamps out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`SessionClient::connect`](crate::SessionClient::connect).
    pub fn validated(mut self) -> Self {
        if self.heartbeat_interval < Self::MIN_HEARTBEAT_INTERVAL {
            tracing::warn!(
                interval = ?self.heartbeat_interval,
                min = ?Self::MIN_HEARTBEAT_INTERVAL,
                "heartbeat interval below minimum, clamping"
            );
            self.heartbeat_interval = Self::MIN_HEARTBEAT_INTERVAL;
        }
        self.command_buffer = self.command_buffer.max(1);
        if let Some(name) = &self.player_name {
            if name.trim().is_empty() {
                self.player_name = None;
            }
        }
        self
    }
}
