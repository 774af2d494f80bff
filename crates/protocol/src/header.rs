//! Fixed-size message header.
//!
//! # Wire format
//!
//! ```text
//! [13 bytes: ASCII "CrypToolStore"]
//! [4 bytes LE: message type code]
//! [4 bytes LE: payload length]
//! ```

use crate::constants::{HEADER_MAGIC, HEADER_SIZE, MAX_PAYLOAD_SIZE, MessageType};
use crate::error::ProtocolError;

/// Decoded message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub message_type: MessageType,
    pub payload_size: u32,
}

impl MessageHeader {
    pub fn new(message_type: MessageType, payload_size: u32) -> Self {
        Self {
            message_type,
            payload_size,
        }
    }

    /// Encodes the header into its 21-byte wire form.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        let magic_len = HEADER_MAGIC.len();
        buf[..magic_len].copy_from_slice(HEADER_MAGIC);
        buf[magic_len..magic_len + 4].copy_from_slice(&self.message_type.code().to_le_bytes());
        buf[magic_len + 4..].copy_from_slice(&self.payload_size.to_le_bytes());
        buf
    }

    /// Decodes a header from the first [`HEADER_SIZE`] bytes of `bytes`.
    ///
    /// Rejects a wrong magic, an unknown type code and a payload length
    /// above [`MAX_PAYLOAD_SIZE`].
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() < HEADER_SIZE {
            return Err(ProtocolError::ShortHeader(bytes.len()));
        }
        let magic_len = HEADER_MAGIC.len();
        if &bytes[..magic_len] != HEADER_MAGIC {
            return Err(ProtocolError::BadMagic);
        }

        let code = read_u32_le(&bytes[magic_len..magic_len + 4]);
        let payload_size = read_u32_le(&bytes[magic_len + 4..HEADER_SIZE]);

        let message_type = MessageType::from_code(code).ok_or(ProtocolError::UnknownType(code))?;
        if payload_size as usize > MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                size: payload_size as usize,
                max: MAX_PAYLOAD_SIZE,
            });
        }

        Ok(Self {
            message_type,
            payload_size,
        })
    }

    /// Payload length as a buffer size.
    pub fn payload_len(&self) -> usize {
        self.payload_size as usize
    }
}

fn read_u32_le(bytes: &[u8]) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(bytes);
    u32::from_le_bytes(raw)
}
