//! Error types for the protocol crate.

/// Errors produced while encoding or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid header magic")]
    BadMagic,

    #[error("header too short: {0} bytes")]
    ShortHeader(usize),

    #[error("unknown message type code {0}")]
    UnknownType(u32),

    #[error("payload of {size} bytes exceeds limit of {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("payload length mismatch: header says {declared}, got {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("malformed {kind:?} payload: {reason}")]
    Malformed {
        kind: crate::MessageType,
        reason: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
