//! Client for the CrypTool artifact store.
//!
//! A [`StoreClient`] holds one TLS session to the store server, pinned to the
//! public key of a known certificate. Domain operations (developers,
//! plugins, sources, resources, resource data) are one request and one
//! response each; file transfers stream 64 KiB chunks with per-chunk
//! acknowledgement, progress samples and cooperative cancellation.

/// Pairs a response kind with a closure that extracts its body, for
/// [`StoreClient::call`](client::StoreClient).
macro_rules! expect_response {
    ($kind:ident) => {
        (
            crypstore_protocol::MessageType::$kind,
            |msg: crypstore_protocol::Message| match msg {
                crypstore_protocol::Message::$kind(body) => Ok(body),
                other => Err(other),
            },
        )
    };
}

pub mod channel;
pub mod client;
pub mod config;
pub mod error;
pub mod rpc;
pub mod session;
pub mod transfer;
pub mod trust;

pub use client::{Reply, StoreClient, Verdict};
pub use config::{ClientConfig, ConfigError, Timeouts, default_config_path};
pub use error::{ClientError, ErrorKind};
pub use rpc::ANY_OWNER;
pub use rpc::sources::SourceFilter;
pub use session::Access;

pub use crypstore_protocol as protocol;
pub use crypstore_transfer::TransferProgress;
pub use tokio_util::sync::CancellationToken;
