//! The store client: one session, many callers.

use tokio::sync::{Mutex, MutexGuard, mpsc};
use tracing::debug;

use crypstore_protocol::messages::{
    EntityResponse, ListResponse, ModificationResponse, TransferAck,
};
use crypstore_protocol::{Message, MessageType};
use crypstore_transfer::TransferProgress;

use crate::channel::Transport;
use crate::config::{ClientConfig, Timeouts};
use crate::error::ClientError;
use crate::session::{Access, Session};

/// Successful outcome of a call: the server's message plus the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    pub message: String,
    pub data: T,
}

impl<T> Reply<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

/// A response body that carries a success flag and a message.
pub trait Verdict {
    type Data;

    /// Splits the body into a [`Reply`] or a [`ClientError::Rejected`].
    fn into_reply(self, kind: MessageType) -> Result<Reply<Self::Data>, ClientError>;
}

impl Verdict for ModificationResponse {
    type Data = ();

    fn into_reply(self, _kind: MessageType) -> Result<Reply<()>, ClientError> {
        if self.modified {
            Ok(Reply::new(self.message, ()))
        } else {
            Err(ClientError::Rejected(self.message))
        }
    }
}

impl<T> Verdict for ListResponse<T> {
    type Data = Vec<T>;

    fn into_reply(self, _kind: MessageType) -> Result<Reply<Vec<T>>, ClientError> {
        if self.allowed_to_view_list {
            Ok(Reply::new(self.message, self.list))
        } else {
            Err(ClientError::Rejected(self.message))
        }
    }
}

impl<T> Verdict for EntityResponse<T> {
    type Data = T;

    fn into_reply(self, kind: MessageType) -> Result<Reply<T>, ClientError> {
        if !self.exists {
            return Err(ClientError::Rejected(self.message));
        }
        let entity = self.entity.ok_or(ClientError::MissingData(kind))?;
        Ok(Reply::new(self.message, entity))
    }
}

impl Verdict for TransferAck {
    type Data = ();

    fn into_reply(self, _kind: MessageType) -> Result<Reply<()>, ClientError> {
        if self.success {
            Ok(Reply::new(self.message, ()))
        } else {
            Err(ClientError::Rejected(self.message))
        }
    }
}

/// Client for the artifact store.
///
/// All operations share one session. Calls from concurrent tasks are
/// serialized: each holds the session for its whole exchange, so requests
/// and responses never interleave on the stream.
pub struct StoreClient {
    session: Mutex<Session>,
}

impl StoreClient {
    /// Creates a client for `config`. The server certificate is loaded and
    /// pinned here; the connection is opened by [`connect`](Self::connect).
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self {
            session: Mutex::new(Session::new(config)?),
        })
    }

    /// Wraps an already connected stream, e.g. an in-memory pipe.
    pub fn from_stream<S: Transport + 'static>(stream: S) -> Self {
        Self::from_stream_with_timeouts(stream, Timeouts::default())
    }

    pub fn from_stream_with_timeouts<S: Transport + 'static>(stream: S, timeouts: Timeouts) -> Self {
        Self {
            session: Mutex::new(Session::with_stream(stream, timeouts)),
        }
    }

    pub async fn connect(&self) -> Result<(), ClientError> {
        self.session.lock().await.connect().await
    }

    pub async fn disconnect(&self) {
        self.session.lock().await.disconnect().await;
    }

    pub async fn is_connected(&self) -> bool {
        self.session.lock().await.is_connected()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.lock().await.is_authenticated()
    }

    pub async fn is_admin(&self) -> bool {
        self.session.lock().await.is_admin()
    }

    /// Logs in. `Ok(false)` means the credentials were refused.
    pub async fn login(&self, username: &str, password: &str) -> Result<bool, ClientError> {
        self.session.lock().await.login(username, password).await
    }

    /// Routes transfer progress samples to `tx`.
    pub async fn set_progress_listener(&self, tx: mpsc::Sender<TransferProgress>) {
        self.session.lock().await.set_progress_listener(Some(tx));
    }

    pub async fn clear_progress_listener(&self) {
        self.session.lock().await.set_progress_listener(None);
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().await
    }

    /// One request, one response.
    ///
    /// Checks `access` without touching the network, sends `request`, and
    /// hands the response to `pick`, which returns the body when the
    /// response is of the `expected` type and gives the message back
    /// otherwise.
    pub(crate) async fn call<R, F>(
        &self,
        access: Access,
        request: Message,
        (expected, pick): (MessageType, F),
    ) -> Result<Reply<R::Data>, ClientError>
    where
        R: Verdict,
        F: FnOnce(Message) -> Result<R, Message>,
    {
        let mut session = self.session.lock().await;
        session.check(access)?;

        let kind = request.message_type();
        debug!(request = ?kind, "sending request");
        let response = session.exchange(&request).await?;
        drop(session);

        match pick(response) {
            Ok(body) => {
                let reply = body.into_reply(expected);
                if let Err(e) = &reply {
                    debug!(request = ?kind, error = %e, "request refused");
                }
                reply
            }
            Err(other) => Err(ClientError::UnexpectedMessage {
                expected,
                received: other.message_type(),
            }),
        }
    }
}
