use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::constants::MessageType;
use crate::error::ProtocolError;
use crate::types::{Developer, Plugin, PublishState, Resource, ResourceData, Source};

/// Encoding of one message body.
///
/// Most bodies are JSON objects; data chunks use a compact binary layout
/// and bodiless messages encode to zero bytes.
pub trait Payload: Sized {
    fn encode(&self) -> Result<Vec<u8>, ProtocolError>;
    fn decode(kind: MessageType, bytes: &[u8]) -> Result<Self, ProtocolError>;
}

fn encode_json<T: Serialize>(body: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(body)?)
}

fn decode_json<T: DeserializeOwned>(kind: MessageType, bytes: &[u8]) -> Result<T, ProtocolError> {
    serde_json::from_slice(bytes).map_err(|e| ProtocolError::Malformed {
        kind,
        reason: e.to_string(),
    })
}

macro_rules! json_payload {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Payload for $ty {
                fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
                    encode_json(self)
                }

                fn decode(kind: MessageType, bytes: &[u8]) -> Result<Self, ProtocolError> {
                    decode_json(kind, bytes)
                }
            }
        )*
    };
}

macro_rules! json_payload_generic {
    ($($name:ident),* $(,)?) => {
        $(
            impl<T: Serialize + DeserializeOwned> Payload for $name<T> {
                fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
                    encode_json(self)
                }

                fn decode(kind: MessageType, bytes: &[u8]) -> Result<Self, ProtocolError> {
                    decode_json(kind, bytes)
                }
            }
        )*
    };
}

fn yes() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Credentials sent to open an authenticated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(rename = "UTCTime")]
    pub utc_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LoginResponse {
    pub login_ok: bool,
    pub message: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LogoutRequest {
    pub username: String,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Filters by owner; `"*"` selects every owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UsernameQuery {
    pub username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct IdQuery {
    pub id: i32,
}

/// Addresses one version of a plugin source or resource data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VersionQuery {
    pub id: i32,
    pub version: i32,
}

/// Source list filter. A plugin id of `-1` or an empty build state means "any".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceListQuery {
    pub plugin_id: i32,
    pub build_state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PublishedListQuery {
    pub publish_state: PublishState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PublishedQuery {
    pub id: i32,
    pub publish_state: PublishState,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Reply to a list request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListResponse<T> {
    #[serde(default = "yes")]
    pub allowed_to_view_list: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
}

/// Reply to a create, update or delete request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ModificationResponse {
    pub modified: bool,
    pub message: String,
}

/// Reply to a single-entity request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntityResponse<T> {
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub entity: Option<T>,
}

/// Error notification from either side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ErrorReport {
    pub message: String,
}

// ---------------------------------------------------------------------------
// File transfer
// ---------------------------------------------------------------------------

/// Announces an upload of `file_size` bytes for `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartUpload<T> {
    pub target: T,
    pub file_size: i64,
}

/// Asks the server to stream the file belonging to `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DownloadRequest<T> {
    pub target: T,
}

/// Acknowledgement of a transfer step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TransferAck {
    pub success: bool,
    pub message: String,
}

impl TransferAck {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: "OK".into(),
        }
    }
}

/// One slice of a file in transit.
///
/// # Wire format
///
/// ```text
/// [8 bytes LE: offset after this chunk]
/// [8 bytes LE: total file size]
/// [rest: chunk bytes]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataChunk {
    /// Cumulative byte count including this chunk.
    pub offset: i64,
    pub file_size: i64,
    pub data: Vec<u8>,
}

const CHUNK_PREFIX: usize = 16;

impl Payload for DataChunk {
    fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut buf = Vec::with_capacity(CHUNK_PREFIX + self.data.len());
        buf.extend_from_slice(&self.offset.to_le_bytes());
        buf.extend_from_slice(&self.file_size.to_le_bytes());
        buf.extend_from_slice(&self.data);
        Ok(buf)
    }

    fn decode(kind: MessageType, bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() < CHUNK_PREFIX {
            return Err(ProtocolError::Malformed {
                kind,
                reason: format!("chunk payload of {} bytes lacks its prefix", bytes.len()),
            });
        }
        let mut word = [0u8; 8];
        word.copy_from_slice(&bytes[..8]);
        let offset = i64::from_le_bytes(word);
        word.copy_from_slice(&bytes[8..CHUNK_PREFIX]);
        let file_size = i64::from_le_bytes(word);
        Ok(Self {
            offset,
            file_size,
            data: bytes[CHUNK_PREFIX..].to_vec(),
        })
    }
}

/// Body of messages that carry no fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Empty;

impl Payload for Empty {
    fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(Vec::new())
    }

    fn decode(_kind: MessageType, _bytes: &[u8]) -> Result<Self, ProtocolError> {
        Ok(Empty)
    }
}

json_payload!(
    LoginRequest,
    LoginResponse,
    LogoutRequest,
    UsernameQuery,
    IdQuery,
    VersionQuery,
    SourceListQuery,
    PublishedListQuery,
    PublishedQuery,
    ModificationResponse,
    ErrorReport,
    TransferAck,
    Developer,
    Plugin,
    Source,
    Resource,
    ResourceData,
);

json_payload_generic!(ListResponse, EntityResponse, StartUpload, DownloadRequest);
