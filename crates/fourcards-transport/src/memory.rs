//! In-memory transport: a connector whose connections are channel pairs.
//!
//! Each call to [`MemoryConnector::offer`] queues one connection that the
//! next `connect` will hand out, and returns the [`MemoryPeer`] that plays
//! the server side of it. When nothing is queued, `connect` fails the way a
//! refused socket would. This lets the session client be driven end to end
//! without a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, mpsc};

use crate::{Connection, ConnectionId, Connector, TransportError};

static NEXT_MEMORY_ID: AtomicU64 = AtomicU64::new(1);

/// What the peer pushes toward the client.
#[derive(Debug)]
enum Frame {
    Data(Vec<u8>),
    Error(String),
}

#[derive(Default)]
struct Shared {
    pending: VecDeque<MemoryConnection>,
    attempts: Vec<String>,
}

/// A [`Connector`] backed by queued in-memory connections.
///
/// Cloning is cheap; clones share the same queue and attempt log.
#[derive(Clone, Default)]
pub struct MemoryConnector {
    shared: Arc<StdMutex<Shared>>,
}

impl MemoryConnector {
    /// Creates a connector with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a connection for the next `connect` call and returns its
    /// server side.
    pub fn offer(&self) -> MemoryPeer {
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let connection = MemoryConnection {
            id: ConnectionId::new(NEXT_MEMORY_ID.fetch_add(1, Ordering::Relaxed)),
            inbound: Mutex::new(inbound_rx),
            outbound: outbound_tx,
        };
        self.lock().pending.push_back(connection);
        MemoryPeer {
            inbound: Some(inbound_tx),
            outbound: outbound_rx,
        }
    }

    /// Every URL `connect` was called with, in order.
    pub fn attempts(&self) -> Vec<String> {
        self.lock().attempts.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Shared> {
        // A poisoned lock only means a test panicked mid-update; the data
        // is still a plain queue.
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Connector for MemoryConnector {
    type Connection = MemoryConnection;

    async fn connect(&self, url: &str) -> Result<Self::Connection, TransportError> {
        let next = {
            let mut shared = self.lock();
            shared.attempts.push(url.to_string());
            shared.pending.pop_front()
        };
        next.ok_or_else(|| TransportError::ConnectFailed {
            url: url.to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "no in-memory connection offered",
            ),
        })
    }
}

/// Client side of an in-memory connection.
pub struct MemoryConnection {
    id: ConnectionId,
    inbound: Mutex<mpsc::UnboundedReceiver<Frame>>,
    outbound: mpsc::UnboundedSender<Vec<u8>>,
}

impl Connection for MemoryConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        self.outbound
            .send(data.to_vec())
            .map_err(|_| TransportError::ConnectionClosed("peer dropped".into()))
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        match self.inbound.lock().await.recv().await {
            Some(Frame::Data(data)) => Ok(Some(data)),
            Some(Frame::Error(reason)) => Err(TransportError::ReceiveFailed(
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, reason),
            )),
            None => Ok(None),
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.inbound.lock().await.close();
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

/// Server side of an in-memory connection.
pub struct MemoryPeer {
    inbound: Option<mpsc::UnboundedSender<Frame>>,
    outbound: mpsc::UnboundedReceiver<Vec<u8>>,
}

impl MemoryPeer {
    /// Delivers one message to the client. Returns `false` once the peer
    /// has hung up or the client is gone.
    pub fn push(&self, data: impl Into<Vec<u8>>) -> bool {
        match &self.inbound {
            Some(tx) => tx.send(Frame::Data(data.into())).is_ok(),
            None => false,
        }
    }

    /// Makes the client's next `recv` fail with a transport error.
    pub fn fail(&self, reason: &str) -> bool {
        match &self.inbound {
            Some(tx) => tx.send(Frame::Error(reason.to_string())).is_ok(),
            None => false,
        }
    }

    /// Closes the server side: the client sees a clean close after any
    /// frames already pushed.
    pub fn hang_up(&mut self) {
        self.inbound = None;
    }

    /// Waits for the next message the client sent. `None` once the client
    /// dropped the connection and everything was drained.
    pub async fn next_sent(&mut self) -> Option<Vec<u8>> {
        self.outbound.recv().await
    }

    /// Returns the next already-sent message without waiting.
    pub fn try_next_sent(&mut self) -> Option<Vec<u8>> {
        self.outbound.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_without_offer_is_refused() {
        let connector = MemoryConnector::new();
        let result = connector.connect("ws://table/websession").await;
        assert!(matches!(result, Err(TransportError::ConnectFailed { .. })));
        assert_eq!(connector.attempts(), vec!["ws://table/websession"]);
    }

    #[tokio::test]
    async fn test_frames_flow_both_ways() {
        let connector = MemoryConnector::new();
        let mut peer = connector.offer();
        let conn = connector.connect("ws://table").await.unwrap();

        assert!(peer.push(b"hello client".to_vec()));
        assert_eq!(conn.recv().await.unwrap(), Some(b"hello client".to_vec()));

        conn.send(b"hello server").await.unwrap();
        assert_eq!(peer.next_sent().await, Some(b"hello server".to_vec()));
    }

    #[tokio::test]
    async fn test_hang_up_reads_as_clean_close() {
        let connector = MemoryConnector::new();
        let mut peer = connector.offer();
        let conn = connector.connect("ws://table").await.unwrap();

        peer.push(b"last".to_vec());
        peer.hang_up();
        assert_eq!(conn.recv().await.unwrap(), Some(b"last".to_vec()));
        assert_eq!(conn.recv().await.unwrap(), None);
        assert!(!peer.push(b"too late".to_vec()));
    }

    #[tokio::test]
    async fn test_fail_surfaces_receive_error() {
        let connector = MemoryConnector::new();
        let peer = connector.offer();
        let conn = connector.connect("ws://table").await.unwrap();

        peer.fail("reset by peer");
        assert!(matches!(
            conn.recv().await,
            Err(TransportError::ReceiveFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_offers_are_handed_out_in_order() {
        let connector = MemoryConnector::new();
        let _first = connector.offer();
        let _second = connector.offer();
        let a = connector.connect("ws://table").await.unwrap();
        let b = connector.connect("ws://table").await.unwrap();
        assert!(a.id().into_inner() < b.id().into_inner());
    }
}
