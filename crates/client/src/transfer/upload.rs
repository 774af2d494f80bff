use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crypstore_protocol::messages::{DataChunk, TransferAck};
use crypstore_protocol::{Message, MessageType};
use crypstore_transfer::{
    CHUNK_SIZE, ChunkReader, ProgressReporter, TransferState, display_name,
    validate_upload_source,
};

use crate::client::{Reply, StoreClient};
use crate::error::ClientError;
use crate::session::{Access, Session};

use super::{UPLOAD_COMPLETED, abandon, send_stop};

impl StoreClient {
    /// Streams the file at `path` to the server.
    ///
    /// `announce` builds the start message from the file size. A rejected
    /// chunk ends the upload with the server's message; no stop message is
    /// sent and the session stays usable.
    pub(crate) async fn upload_file<F>(
        &self,
        path: &Path,
        announce: F,
        cancel: &CancellationToken,
    ) -> Result<Reply<()>, ClientError>
    where
        F: FnOnce(i64) -> Message,
    {
        let mut session = self.lock().await;
        session.check(Access::Connected)?;

        validate_upload_source(path).await?;
        let mut reader = ChunkReader::open(path, CHUNK_SIZE).await?;
        let name = display_name(path);
        let request = announce(reader.file_size());

        let result = send_file(&mut session, &mut reader, request, &name, cancel).await;
        if let Err(e) = &result {
            abandon(&mut session, e).await;
        }
        result
    }
}

/// Announces the upload and streams every chunk of `reader`.
async fn send_file(
    session: &mut Session,
    reader: &mut ChunkReader,
    request: Message,
    name: &str,
    cancel: &CancellationToken,
) -> Result<Reply<()>, ClientError> {
    let file_size = reader.file_size();
    let mut state = TransferState::new(file_size);
    let mut progress = ProgressReporter::new(session.progress_listener(), name, file_size);

    info!(file = %name, file_size, kind = ?request.message_type(), "upload starting");
    state.announce();
    let ack = expect_ack(session.exchange(&request).await?)?;
    if !ack.success {
        state.fail();
        info!(file = %name, reason = %ack.message, "upload refused");
        return Err(ClientError::Rejected(ack.message));
    }

    state.begin();
    while reader.remaining() > 0 {
        if cancel.is_cancelled() {
            state.abort();
            send_stop(session).await;
            info!(file = %name, sent = state.transferred(), "upload stopped by user");
            return Err(ClientError::Cancelled);
        }

        let Some(chunk) = reader.next_chunk().await? else {
            break;
        };
        let offset = chunk.end();
        let advanced = state.advance(chunk.data.len());
        debug_assert_eq!(advanced, Some(offset));

        session
            .send(&Message::UploadDownloadData(DataChunk {
                offset,
                file_size,
                data: chunk.data,
            }))
            .await?;

        let ack = expect_ack(session.receive().await?)?;
        if !ack.success {
            state.fail();
            warn!(file = %name, offset, reason = %ack.message, "chunk refused by server");
            return Err(ClientError::Rejected(ack.message));
        }
        debug!(offset, file_size, "chunk acknowledged");
        progress.advance(offset);
    }

    state.complete();
    progress.finish(state.transferred());
    info!(file = %name, file_size, "upload completed");
    Ok(Reply::new(UPLOAD_COMPLETED, ()))
}

fn expect_ack(msg: Message) -> Result<TransferAck, ClientError> {
    match msg {
        Message::ResponseUploadDownloadData(ack) => Ok(ack),
        other => Err(ClientError::UnexpectedMessage {
            expected: MessageType::ResponseUploadDownloadData,
            received: other.message_type(),
        }),
    }
}
