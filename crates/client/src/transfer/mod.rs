//! File transfers: start message, chunk stream with per-chunk acks.
//!
//! A transfer holds the session for its whole duration, so no other call
//! can interleave with the chunk stream.

mod download;
mod upload;

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crypstore_protocol::messages::{DownloadRequest, Empty, StartUpload};
use crypstore_protocol::{Message, ResourceData, Source};

use crate::client::{Reply, StoreClient};
use crate::error::ClientError;
use crate::session::Session;

pub(crate) const UPLOAD_COMPLETED: &str = "Upload completed";
pub(crate) const DOWNLOAD_COMPLETED: &str = "Download completed";

/// Tells the server to abandon the running transfer. Best effort: the
/// caller reports its own outcome either way.
async fn send_stop(session: &mut Session) {
    if let Err(e) = session.send(&Message::StopUploadDownload(Empty)).await {
        warn!(error = %e, "failed to send stop message");
    }
}

/// Puts the stream back in request/response order after a transfer failed.
///
/// A refusal means the server already left its transfer loop, and a
/// cancellation has sent its own stop. After an unexpected reply kind the
/// server's position is unknown, so the session is closed. Every other
/// failure was detected on this side while the server still waits for a
/// chunk or an ack; it gets a stop message.
async fn abandon(session: &mut Session, error: &ClientError) {
    if !session.is_connected() {
        return;
    }
    match error {
        ClientError::Cancelled | ClientError::Rejected(_) => {}
        ClientError::UnexpectedMessage { .. } => {
            warn!(error = %error, "closing session after unexpected transfer reply");
            session.close().await;
        }
        _ => {
            warn!(error = %error, "transfer aborted locally, stopping server side");
            send_stop(session).await;
        }
    }
}

impl StoreClient {
    /// Uploads the zip at `path` as the source archive of `source`.
    pub async fn upload_source_zip(
        &self,
        source: &Source,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Reply<()>, ClientError> {
        let target = source.clone();
        self.upload_file(
            path,
            |file_size| Message::StartUploadSourceZipfile(StartUpload { target, file_size }),
            cancel,
        )
        .await
    }

    /// Uploads the zip at `path` as the built assemblies of `source`.
    pub async fn upload_assembly_zip(
        &self,
        source: &Source,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Reply<()>, ClientError> {
        let target = source.clone();
        self.upload_file(
            path,
            |file_size| Message::StartUploadAssemblyZipfile(StartUpload { target, file_size }),
            cancel,
        )
        .await
    }

    pub async fn upload_resource_data_file(
        &self,
        data: &ResourceData,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Reply<()>, ClientError> {
        let target = data.clone();
        self.upload_file(
            path,
            |file_size| Message::StartUploadResourceDataFile(StartUpload { target, file_size }),
            cancel,
        )
        .await
    }

    /// Downloads the source archive of `source` to `path`, which must not exist.
    pub async fn download_source_zip(
        &self,
        source: &Source,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Reply<()>, ClientError> {
        let request = Message::RequestDownloadSourceZipfile(DownloadRequest {
            target: source.clone(),
        });
        self.download_file(request, path, cancel).await
    }

    pub async fn download_assembly_zip(
        &self,
        source: &Source,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Reply<()>, ClientError> {
        let request = Message::RequestDownloadAssemblyZipfile(DownloadRequest {
            target: source.clone(),
        });
        self.download_file(request, path, cancel).await
    }

    pub async fn download_resource_data_file(
        &self,
        data: &ResourceData,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Reply<()>, ClientError> {
        let request = Message::RequestDownloadResourceDataFile(DownloadRequest {
            target: data.clone(),
        });
        self.download_file(request, path, cancel).await
    }
}
