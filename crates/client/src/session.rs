//! One logical connection to the store server.

use std::sync::Arc;

use chrono::Utc;
use rustls_pki_types::ServerName;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_rustls::TlsConnector;
use tracing::{debug, info, warn};

use crypstore_protocol::messages::{LoginRequest, LogoutRequest};
use crypstore_protocol::{Message, MessageType};
use crypstore_transfer::TransferProgress;

use crate::channel::{MessageChannel, Transport};
use crate::config::{ClientConfig, ConfigError, Timeouts};
use crate::error::ClientError;
use crate::trust::{PinnedKeyVerifier, tls_client_config};

/// Privilege an operation needs before anything is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Connected,
    Authenticated,
    Admin,
}

/// Where and how to open the encrypted stream.
struct Endpoint {
    address: String,
    port: u16,
    tls: TlsConnector,
}

/// Connection state: the stream plus what the server told us about the user.
pub struct Session {
    endpoint: Option<Endpoint>,
    timeouts: Timeouts,
    channel: Option<MessageChannel<Box<dyn Transport>>>,
    username: String,
    authenticated: bool,
    is_admin: bool,
    progress: Option<mpsc::Sender<TransferProgress>>,
}

impl Session {
    /// Prepares a session for `config`. Loads and pins the server
    /// certificate; does not touch the network.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let cert = config.load_server_certificate()?;
        let verifier = PinnedKeyVerifier::from_certificate(&cert).map_err(|reason| {
            ConfigError::Certificate {
                path: config.server_certificate.clone(),
                reason,
            }
        })?;
        let tls = tls_client_config(Arc::new(verifier)).map_err(ConfigError::from)?;

        Ok(Self {
            endpoint: Some(Endpoint {
                address: config.server_address.clone(),
                port: config.server_port,
                tls: TlsConnector::from(Arc::new(tls)),
            }),
            ..Self::detached(config.timeouts())
        })
    }

    /// A session already running on `stream`. It cannot reconnect once closed.
    pub fn with_stream<S: Transport + 'static>(stream: S, timeouts: Timeouts) -> Self {
        let stream: Box<dyn Transport> = Box::new(stream);
        let mut session = Self::detached(timeouts);
        session.channel = Some(MessageChannel::new(stream, timeouts.read, timeouts.write));
        session
    }

    fn detached(timeouts: Timeouts) -> Self {
        Self {
            endpoint: None,
            timeouts,
            channel: None,
            username: String::new(),
            authenticated: false,
            is_admin: false,
            progress: None,
        }
    }

    /// Opens TCP, then TLS with key pinning. No-op when already connected.
    pub async fn connect(&mut self) -> Result<(), ClientError> {
        if self.channel.is_some() {
            return Ok(());
        }
        let endpoint = self
            .endpoint
            .as_ref()
            .ok_or(ClientError::Config(ConfigError::NoEndpoint))?;

        let addr = format!("{}:{}", endpoint.address, endpoint.port);
        debug!(%addr, "connecting to store server");
        let tcp = tokio::time::timeout(self.timeouts.connect, TcpStream::connect(&addr))
            .await
            .map_err(|_| ClientError::Timeout("connect"))??;
        tcp.set_nodelay(true)?;

        let server_name = ServerName::try_from(endpoint.address.clone()).map_err(|e| {
            ClientError::InvalidArgument(format!("invalid server address {}: {e}", endpoint.address))
        })?;
        let tls = tokio::time::timeout(
            self.timeouts.connect,
            endpoint.tls.connect(server_name, tcp),
        )
        .await
        .map_err(|_| ClientError::Timeout("TLS handshake"))?
        .map_err(|e| ClientError::Handshake(e.to_string()))?;

        let stream: Box<dyn Transport> = Box::new(tls);
        self.channel = Some(MessageChannel::new(
            stream,
            self.timeouts.read,
            self.timeouts.write,
        ));
        info!(%addr, "connected to store server");
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Fails with the first unmet precondition for `access`.
    pub fn check(&self, access: Access) -> Result<(), ClientError> {
        if self.channel.is_none() {
            return Err(ClientError::NotConnected);
        }
        match access {
            Access::Connected => Ok(()),
            Access::Authenticated if !self.authenticated => Err(ClientError::NotAuthenticated),
            Access::Admin if !self.is_admin => Err(ClientError::NotAdmin),
            Access::Authenticated | Access::Admin => Ok(()),
        }
    }

    /// Authenticates. `Ok(false)` means the server refused the credentials.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<bool, ClientError> {
        self.authenticated = false;
        self.is_admin = false;
        self.check(Access::Connected)?;

        let request = Message::Login(LoginRequest {
            username: username.into(),
            password: password.into(),
            utc_time: Utc::now(),
        });
        match self.exchange(&request).await? {
            Message::ResponseLogin(resp) if resp.login_ok => {
                self.authenticated = true;
                self.is_admin = resp.is_admin;
                self.username = username.into();
                info!(username, admin = resp.is_admin, "logged in");
                Ok(true)
            }
            Message::ResponseLogin(resp) => {
                info!(username, reason = %resp.message, "login rejected");
                Ok(false)
            }
            other => Err(ClientError::UnexpectedMessage {
                expected: MessageType::ResponseLogin,
                received: other.message_type(),
            }),
        }
    }

    /// Tells the server goodbye (best effort) and closes the stream.
    pub async fn disconnect(&mut self) {
        let Some(channel) = self.channel.as_mut() else {
            return;
        };
        let logout = Message::Logout(LogoutRequest {
            username: self.username.clone(),
        });
        if let Err(e) = channel.send(&logout).await {
            warn!(error = %e, "failed to send logout");
        }
        self.close().await;
        info!("disconnected from store server");
    }

    /// Drops the stream without a goodbye and forgets the login.
    pub async fn close(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            channel.shutdown().await;
        }
        self.authenticated = false;
        self.is_admin = false;
        self.username.clear();
    }

    /// Sends one message. A transport failure closes the session.
    pub async fn send(&mut self, msg: &Message) -> Result<(), ClientError> {
        let channel = self.channel.as_mut().ok_or(ClientError::NotConnected)?;
        let result = channel.send(msg).await;
        if let Err(e) = result {
            if e.is_connection_lost() {
                warn!(error = %e, "send failed, closing session");
                self.close().await;
            }
            return Err(e);
        }
        Ok(())
    }

    /// Receives one message. End of stream or any read failure closes the session.
    pub async fn receive(&mut self) -> Result<Message, ClientError> {
        let channel = self.channel.as_mut().ok_or(ClientError::NotConnected)?;
        let result = channel.receive().await;
        match result {
            Ok(Some(msg)) => Ok(msg),
            Ok(None) => {
                info!("connection closed by server");
                self.close().await;
                Err(ClientError::ConnectionLost)
            }
            Err(e) => {
                warn!(error = %e, "receive failed, closing session");
                self.close().await;
                Err(e)
            }
        }
    }

    /// Sends `request` and returns the single message that answers it.
    pub async fn exchange(&mut self, request: &Message) -> Result<Message, ClientError> {
        self.send(request).await?;
        self.receive().await
    }

    pub fn set_progress_listener(&mut self, tx: Option<mpsc::Sender<TransferProgress>>) {
        self.progress = tx;
    }

    pub fn progress_listener(&self) -> Option<mpsc::Sender<TransferProgress>> {
        self.progress.clone()
    }
}
