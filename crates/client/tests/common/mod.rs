//! Shared harness: a client wired to an in-memory mock server.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use crypstore_client::channel::MessageChannel;
use crypstore_client::protocol::Message;
use crypstore_client::protocol::messages::{EntityResponse, IdQuery, LoginResponse, TransferAck};
use crypstore_client::{StoreClient, Timeouts};
use tokio::io::DuplexStream;
use tracing_subscriber::EnvFilter;

pub type Server = MessageChannel<DuplexStream>;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// A connected client and the server end of its stream.
pub fn pair() -> (StoreClient, Server) {
    init_tracing();
    let (a, b) = tokio::io::duplex(256 * 1024);
    let timeouts = Timeouts::default();
    (
        StoreClient::from_stream_with_timeouts(a, timeouts),
        MessageChannel::new(b, timeouts.read, timeouts.write),
    )
}

/// Next message from the client; panics if the client closed the stream.
pub async fn next(server: &mut Server) -> Message {
    server
        .receive()
        .await
        .unwrap()
        .expect("client closed the stream")
}

pub async fn reply(server: &mut Server, msg: Message) {
    server.send(&msg).await.unwrap();
}

pub async fn ack(server: &mut Server, success: bool, message: &str) {
    reply(
        server,
        Message::ResponseUploadDownloadData(TransferAck {
            success,
            message: message.into(),
        }),
    )
    .await;
}

/// Runs a login exchange answered with `login_ok` / `is_admin`.
pub async fn login(client: &StoreClient, server: &mut Server, login_ok: bool, is_admin: bool) -> bool {
    let (result, ()) = tokio::join!(client.login("alice", "secret"), async {
        let Message::Login(_) = next(server).await else {
            panic!("expected a login request");
        };
        reply(
            server,
            Message::ResponseLogin(LoginResponse {
                login_ok,
                message: if login_ok { "Welcome".into() } else { "Wrong password".into() },
                is_admin,
            }),
        )
        .await;
    });
    result.unwrap()
}

/// Answers a get-plugin request for id 5, so a test can see what the client
/// sends after a transfer ended.
pub async fn answer_get_plugin(server: &mut Server) {
    match next(server).await {
        Message::RequestPlugin(IdQuery { id }) => assert_eq!(id, 5),
        other => panic!("expected the follow-up request, got {other:?}"),
    }
    reply(
        server,
        Message::ResponsePlugin(EntityResponse {
            exists: true,
            message: String::new(),
            entity: Some(Default::default()),
        }),
    )
    .await;
}

/// Writes `len` bytes of a repeating pattern to `dir/name`.
pub fn pattern_file(dir: &Path, name: &str, len: usize) -> PathBuf {
    let path = dir.join(name);
    let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    std::fs::write(&path, data).unwrap();
    path
}
