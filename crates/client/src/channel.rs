//! Framed message I/O over an established byte stream.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crypstore_protocol::{HEADER_SIZE, Message, MessageHeader};

use crate::error::ClientError;

/// A bidirectional byte stream a session can run on.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

/// Sends and receives whole [`Message`]s.
///
/// Each read and each write is bounded by its own timeout.
pub struct MessageChannel<S> {
    stream: S,
    read_timeout: Duration,
    write_timeout: Duration,
}

impl<S: AsyncRead + AsyncWrite + Unpin> MessageChannel<S> {
    pub fn new(stream: S, read_timeout: Duration, write_timeout: Duration) -> Self {
        Self {
            stream,
            read_timeout,
            write_timeout,
        }
    }

    /// Serializes `msg` and writes it completely.
    pub async fn send(&mut self, msg: &Message) -> Result<(), ClientError> {
        let bytes = msg.serialize()?;
        let limit = self.write_timeout;
        let stream = &mut self.stream;
        let write = async {
            stream.write_all(&bytes).await?;
            stream.flush().await
        };
        tokio::time::timeout(limit, write)
            .await
            .map_err(|_| ClientError::Timeout("write"))??;

        trace!(kind = ?msg.message_type(), bytes = bytes.len(), "message sent");
        Ok(())
    }

    /// Reads one message.
    ///
    /// Returns `Ok(None)` when the peer closed the stream, whether before
    /// the header or in the middle of the payload.
    pub async fn receive(&mut self) -> Result<Option<Message>, ClientError> {
        let mut header_bytes = [0u8; HEADER_SIZE];
        if !self.read_full(&mut header_bytes).await? {
            debug!("stream closed while waiting for a header");
            return Ok(None);
        }
        let header = MessageHeader::decode(&header_bytes)?;

        let mut payload = vec![0u8; header.payload_len()];
        if !self.read_full(&mut payload).await? {
            debug!(kind = ?header.message_type, "stream closed inside a payload");
            return Ok(None);
        }

        let msg = Message::decode_body(header.message_type, &payload)?;
        trace!(kind = ?header.message_type, bytes = payload.len(), "message received");
        Ok(Some(msg))
    }

    /// Fills `buf`, looping on short reads. Returns `false` on a zero-length read.
    async fn read_full(&mut self, buf: &mut [u8]) -> Result<bool, ClientError> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = tokio::time::timeout(self.read_timeout, self.stream.read(&mut buf[filled..]))
                .await
                .map_err(|_| ClientError::Timeout("read"))??;
            if n == 0 {
                return Ok(false);
            }
            filled += n;
        }
        Ok(true)
    }

    /// Shuts down the write half. Errors are ignored.
    pub async fn shutdown(&mut self) {
        let _ = tokio::time::timeout(self.write_timeout, self.stream.shutdown()).await;
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }
}
