use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crypstore_protocol::messages::{DataChunk, TransferAck};
use crypstore_protocol::{Message, MessageType, ProtocolError};
use crypstore_transfer::{
    PartFile, ProgressReporter, TransferState, display_name, validate_download_target,
};

use crate::client::{Reply, StoreClient};
use crate::error::ClientError;
use crate::session::{Access, Session};

use super::{DOWNLOAD_COMPLETED, abandon, send_stop};

impl StoreClient {
    /// Sends `request` and writes the streamed file to `path`.
    ///
    /// Data lands in `<path>.part`, which is renamed on success and removed
    /// on any failure.
    pub(crate) async fn download_file(
        &self,
        request: Message,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Reply<()>, ClientError> {
        let mut session = self.lock().await;
        session.check(Access::Connected)?;

        validate_download_target(path).await?;
        let mut part = PartFile::create(path).await?;
        let name = display_name(path);

        info!(file = %name, kind = ?request.message_type(), "download starting");
        let outcome = match session.send(&request).await {
            Ok(()) => receive_file(&mut session, &mut part, &name, cancel).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(written) => {
                part.commit().await?;
                info!(file = %name, bytes = written, "download completed");
                Ok(Reply::new(DOWNLOAD_COMPLETED, ()))
            }
            Err(e) => {
                abandon(&mut session, &e).await;
                if let Err(cleanup) = part.discard().await {
                    warn!(file = %name, error = %cleanup, "failed to remove partial download");
                }
                Err(e)
            }
        }
    }
}

/// Receives chunks until the announced size is reached. Returns the byte count.
async fn receive_file(
    session: &mut Session,
    part: &mut PartFile,
    name: &str,
    cancel: &CancellationToken,
) -> Result<i64, ClientError> {
    // Size is announced by the first chunk.
    let mut transfer: Option<(TransferState, ProgressReporter)> = None;

    loop {
        let msg = session.receive().await?;

        if cancel.is_cancelled() {
            send_stop(session).await;
            let received = transfer.as_ref().map_or(0, |(state, _)| state.transferred());
            info!(file = %name, received, "download stopped by user");
            return Err(ClientError::Cancelled);
        }

        match msg {
            Message::UploadDownloadData(chunk) => {
                let (state, progress) = transfer.get_or_insert_with(|| {
                    let mut state = TransferState::new(chunk.file_size);
                    state.begin();
                    let progress =
                        ProgressReporter::new(session.progress_listener(), name, chunk.file_size);
                    (state, progress)
                });

                let written = accept_chunk(state, &chunk)?;
                part.append(&chunk.data).await?;
                session
                    .send(&Message::ResponseUploadDownloadData(TransferAck::ok()))
                    .await?;
                debug!(offset = written, file_size = state.file_size(), "chunk received");

                if state.is_done() {
                    state.complete();
                    progress.finish(written);
                    return Ok(written);
                }
                progress.advance(written);
            }
            Message::ResponseUploadDownloadData(ack) => {
                info!(file = %name, reason = %ack.message, "download refused");
                return Err(ClientError::Rejected(ack.message));
            }
            other => {
                return Err(ClientError::UnexpectedMessage {
                    expected: MessageType::UploadDownloadData,
                    received: other.message_type(),
                });
            }
        }
    }
}

/// Checks a chunk against the running totals and returns the new total.
fn accept_chunk(state: &mut TransferState, chunk: &DataChunk) -> Result<i64, ClientError> {
    let violation = |reason: String| {
        ClientError::Protocol(ProtocolError::Malformed {
            kind: MessageType::UploadDownloadData,
            reason,
        })
    };

    if chunk.file_size != state.file_size() {
        state.fail();
        return Err(violation(format!(
            "file size changed from {} to {}",
            state.file_size(),
            chunk.file_size
        )));
    }
    let Some(written) = state.advance(chunk.data.len()) else {
        state.fail();
        return Err(violation(format!(
            "server sent more than the announced {} bytes",
            state.file_size()
        )));
    };
    if chunk.offset != written {
        state.fail();
        return Err(violation(format!(
            "chunk offset {} does not match {written} bytes received",
            chunk.offset
        )));
    }
    Ok(written)
}
