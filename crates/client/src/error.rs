//! Error types for the store client.

use crypstore_protocol::{MessageType, ProtocolError};
use crypstore_transfer::TransferError;

use crate::config::ConfigError;

/// Coarse classification of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotConnected,
    NotAuthenticated,
    NotAuthorized,
    /// The stream closed, timed out or failed; the session is closed.
    ConnectionLost,
    ProtocolViolation,
    /// The server answered and said no.
    ServerRejected,
    UserCancelled,
    LocalIoError,
    Configuration,
    InvalidArgument,
}

/// Errors produced by the store client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Not connected")]
    NotConnected,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Not authenticated as admin")]
    NotAdmin,

    #[error("Connection to server lost")]
    ConnectionLost,

    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("TLS handshake failed: {0}")]
    Handshake(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Response from server had wrong message type: expected {expected:?}, got {received:?}")]
    UnexpectedMessage {
        expected: MessageType,
        received: MessageType,
    },

    #[error("{0:?} response reported success without data")]
    MissingData(MessageType),

    #[error("{0}")]
    Rejected(String),

    #[error("transfer stopped by user")]
    Cancelled,

    #[error(transparent)]
    Local(#[from] TransferError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    InvalidArgument(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConnected => ErrorKind::NotConnected,
            Self::NotAuthenticated => ErrorKind::NotAuthenticated,
            Self::NotAdmin => ErrorKind::NotAuthorized,
            Self::ConnectionLost | Self::Transport(_) | Self::Timeout(_) | Self::Handshake(_) => {
                ErrorKind::ConnectionLost
            }
            Self::Protocol(_) | Self::UnexpectedMessage { .. } | Self::MissingData(_) => {
                ErrorKind::ProtocolViolation
            }
            Self::Rejected(_) => ErrorKind::ServerRejected,
            Self::Cancelled => ErrorKind::UserCancelled,
            Self::Local(_) => ErrorKind::LocalIoError,
            Self::Config(_) => ErrorKind::Configuration,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }

    /// `true` when the user stopped a transfer; callers usually show no error for this.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// `true` when the session was closed because of this error.
    pub fn is_connection_lost(&self) -> bool {
        self.kind() == ErrorKind::ConnectionLost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_messages() {
        assert_eq!(ClientError::NotConnected.to_string(), "Not connected");
        assert_eq!(ClientError::NotAuthenticated.to_string(), "Not authenticated");
        assert_eq!(
            ClientError::NotAdmin.to_string(),
            "Not authenticated as admin"
        );
        assert_eq!(
            ClientError::ConnectionLost.to_string(),
            "Connection to server lost"
        );
    }

    #[test]
    fn transport_failures_are_connection_lost() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        assert_eq!(ClientError::from(io).kind(), ErrorKind::ConnectionLost);
        assert_eq!(
            ClientError::Timeout("read").kind(),
            ErrorKind::ConnectionLost
        );
        assert!(ClientError::Handshake("bad key".into()).is_connection_lost());
    }

    #[test]
    fn unexpected_message_names_both_types() {
        let err = ClientError::UnexpectedMessage {
            expected: MessageType::ResponsePlugin,
            received: MessageType::ServerError,
        };
        assert_eq!(err.kind(), ErrorKind::ProtocolViolation);
        let text = err.to_string();
        assert!(text.contains("ResponsePlugin"));
        assert!(text.contains("ServerError"));
    }

    #[test]
    fn rejection_is_verbatim() {
        let err = ClientError::Rejected("Plugin does not exist".into());
        assert_eq!(err.to_string(), "Plugin does not exist");
        assert_eq!(err.kind(), ErrorKind::ServerRejected);
    }

    #[test]
    fn cancelled_is_distinguishable() {
        assert!(ClientError::Cancelled.is_cancelled());
        assert_eq!(ClientError::Cancelled.kind(), ErrorKind::UserCancelled);
        assert!(!ClientError::ConnectionLost.is_cancelled());
    }

    #[test]
    fn local_errors() {
        let err = ClientError::from(TransferError::InvalidPath("x".into()));
        assert_eq!(err.kind(), ErrorKind::LocalIoError);
    }
}
