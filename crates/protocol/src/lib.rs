//! Wire protocol for the artifact store.
//!
//! Every message on the stream is a fixed 21-byte [`MessageHeader`]
//! followed by a payload whose encoding depends on the [`MessageType`].
//! [`Message`] is the typed, decoded form of one such unit.

pub mod constants;
pub mod envelope;
pub mod error;
pub mod header;
pub mod messages;
pub mod types;

pub use constants::{HEADER_MAGIC, HEADER_SIZE, MAX_PAYLOAD_SIZE, MessageType};
pub use envelope::Message;
pub use error::ProtocolError;
pub use header::MessageHeader;
pub use types::{
    BuildState, Developer, Plugin, PluginAndSource, PublishState, Resource,
    ResourceAndResourceData, ResourceData, Source,
};
