//! Unified error type for the session client.

use fourcards_protocol::ProtocolError;
use fourcards_session::SessionError;
use fourcards_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls, so
/// the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A transport-level error (connect, send, recv). Inside the client
    /// this triggers a reconnect.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session rule refused the operation.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// An intent was sent while the connection is not up. The intent is
    /// dropped, not queued.
    #[error("not connected")]
    NotConnected,

    /// The client task has stopped.
    #[error("session client has shut down")]
    Shutdown,

    /// The page URL could not be turned into an endpoint.
    #[error("invalid page url: {0}")]
    InvalidUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let client_err: ClientError = err.into();
        assert!(matches!(client_err, ClientError::Transport(_)));
        assert!(client_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let client_err: ClientError = err.into();
        assert!(matches!(client_err, ClientError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let client_err: ClientError = SessionError::GameConcluded.into();
        assert!(matches!(
            client_err,
            ClientError::Session(SessionError::GameConcluded)
        ));
    }

    #[test]
    fn test_not_connected_message() {
        assert_eq!(ClientError::NotConnected.to_string(), "not connected");
    }
}
