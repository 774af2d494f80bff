mod common;

use std::path::Path;

use crypstore_client::protocol::messages::{DataChunk, ErrorReport};
use crypstore_client::protocol::{Message, ResourceData, Source};
use crypstore_client::{CancellationToken, ClientError, ErrorKind};
use tokio::sync::mpsc;

use common::{Server, ack, answer_get_plugin, next, pair};

fn part_of(path: &Path) -> std::path::PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    name.into()
}

/// Sends `content` in chunks of `chunk` bytes, waiting for an ack after each.
async fn serve_file(server: &mut Server, content: &[u8], chunk: usize) {
    let file_size = content.len() as i64;
    let mut offset = 0i64;
    for piece in content.chunks(chunk) {
        offset += piece.len() as i64;
        server
            .send(&Message::UploadDownloadData(DataChunk {
                offset,
                file_size,
                data: piece.to_vec(),
            }))
            .await
            .unwrap();
        match next(server).await {
            Message::ResponseUploadDownloadData(ack) => assert!(ack.success),
            other => panic!("expected chunk ack, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn download_writes_final_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("source.zip");
    let content: Vec<u8> = (0..200_000u32).map(|i| (i % 256) as u8).collect();

    let (client, mut server) = pair();
    let (tx, mut rx) = mpsc::channel(16);
    client.set_progress_listener(tx).await;
    let cancel = CancellationToken::new();

    let source = Source {
        plugin_id: 4,
        plugin_version: 2,
        ..Default::default()
    };
    let (result, ()) = tokio::join!(
        client.download_source_zip(&source, &target, &cancel),
        async {
            match next(&mut server).await {
                Message::RequestDownloadSourceZipfile(req) => {
                    assert_eq!(req.target.plugin_id, 4);
                    assert_eq!(req.target.plugin_version, 2);
                }
                other => panic!("unexpected {other:?}"),
            }
            serve_file(&mut server, &content, 64 * 1024).await;
        }
    );

    assert_eq!(result.unwrap().message, "Download completed");
    assert_eq!(std::fs::read(&target).unwrap(), content);
    assert!(!part_of(&target).exists());

    let mut last = None;
    while let Ok(sample) = rx.try_recv() {
        last = Some(sample);
    }
    let last = last.unwrap();
    assert_eq!(last.transferred, 200_000);
    assert_eq!(last.bytes_per_second, 0);
}

#[tokio::test]
async fn existing_target_fails_before_network() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("taken.zip");
    std::fs::write(&target, b"keep me").unwrap();

    let (client, mut server) = pair();
    let cancel = CancellationToken::new();
    let err = client
        .download_assembly_zip(&Source::default(), &target, &cancel)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LocalIoError);
    assert!(err.to_string().contains("already exists"));
    assert_eq!(std::fs::read(&target).unwrap(), b"keep me");

    drop(client);
    assert!(server.receive().await.unwrap().is_none());
}

#[tokio::test]
async fn cancellation_removes_part_file_and_sends_stop() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("data.bin");
    let (client, mut server) = pair();
    let cancel = CancellationToken::new();

    let resource = ResourceData::default();
    let (result, ()) = tokio::join!(
        client.download_resource_data_file(&resource, &target, &cancel),
        async {
            let Message::RequestDownloadResourceDataFile(_) = next(&mut server).await else {
                panic!("expected resource data download request");
            };
            server
                .send(&Message::UploadDownloadData(DataChunk {
                    offset: 1000,
                    file_size: 3000,
                    data: vec![7; 1000],
                }))
                .await
                .unwrap();
            let Message::ResponseUploadDownloadData(_) = next(&mut server).await else {
                panic!("expected chunk ack");
            };
            assert!(part_of(&target).exists());

            cancel.cancel();
            server
                .send(&Message::UploadDownloadData(DataChunk {
                    offset: 2000,
                    file_size: 3000,
                    data: vec![7; 1000],
                }))
                .await
                .unwrap();
            let msg = next(&mut server).await;
            assert!(
                matches!(msg, Message::StopUploadDownload(_)),
                "expected stop, got {msg:?}"
            );
        }
    );

    assert!(result.unwrap_err().is_cancelled());
    assert!(!target.exists());
    assert!(!part_of(&target).exists());
    assert!(client.is_connected().await);
}

#[tokio::test]
async fn short_download_then_close_is_connection_lost() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("short.zip");
    let (client, mut server) = pair();
    let cancel = CancellationToken::new();

    let source = Source::default();
    let (result, ()) = tokio::join!(
        client.download_source_zip(&source, &target, &cancel),
        async {
            next(&mut server).await;
            server
                .send(&Message::UploadDownloadData(DataChunk {
                    offset: 3,
                    file_size: 10,
                    data: vec![1, 2, 3],
                }))
                .await
                .unwrap();
            let Message::ResponseUploadDownloadData(_) = next(&mut server).await else {
                panic!("expected chunk ack");
            };
            server.shutdown().await;
        }
    );

    let err = result.unwrap_err();
    assert!(matches!(err, ClientError::ConnectionLost));
    assert!(!target.exists());
    assert!(!part_of(&target).exists());
    assert!(!client.is_connected().await);

    let err = client
        .download_source_zip(&Source::default(), &target, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotConnected));
}

#[tokio::test]
async fn refusal_removes_part_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("missing.zip");
    let (client, mut server) = pair();
    let cancel = CancellationToken::new();

    let source = Source::default();
    let (result, ()) = tokio::join!(
        client.download_source_zip(&source, &target, &cancel),
        async {
            next(&mut server).await;
            ack(&mut server, false, "Source zipfile does not exist").await;
        }
    );
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServerRejected);
    assert_eq!(err.to_string(), "Source zipfile does not exist");
    assert!(!part_of(&target).exists());
    assert!(client.is_connected().await);
}

#[tokio::test]
async fn overrun_is_protocol_violation() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("big.zip");
    let (client, mut server) = pair();
    let cancel = CancellationToken::new();

    let source = Source::default();
    let (result, ()) = tokio::join!(
        client.download_source_zip(&source, &target, &cancel),
        async {
            next(&mut server).await;
            server
                .send(&Message::UploadDownloadData(DataChunk {
                    offset: 8,
                    file_size: 4,
                    data: vec![0; 8],
                }))
                .await
                .unwrap();
            let msg = next(&mut server).await;
            assert!(
                matches!(msg, Message::StopUploadDownload(_)),
                "expected stop, got {msg:?}"
            );
        }
    );
    assert_eq!(result.unwrap_err().kind(), ErrorKind::ProtocolViolation);
    assert!(!target.exists());
    assert!(!part_of(&target).exists());
}

#[tokio::test]
async fn offset_mismatch_stops_transfer_and_keeps_session() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("skewed.zip");
    let (client, mut server) = pair();
    let cancel = CancellationToken::new();

    let source = Source::default();
    let (result, ()) = tokio::join!(
        client.download_source_zip(&source, &target, &cancel),
        async {
            next(&mut server).await;
            server
                .send(&Message::UploadDownloadData(DataChunk {
                    offset: 5,
                    file_size: 10,
                    data: vec![1, 2, 3],
                }))
                .await
                .unwrap();
            let msg = next(&mut server).await;
            assert!(
                matches!(msg, Message::StopUploadDownload(_)),
                "expected stop, got {msg:?}"
            );
        }
    );
    assert_eq!(result.unwrap_err().kind(), ErrorKind::ProtocolViolation);
    assert!(!target.exists());
    assert!(!part_of(&target).exists());
    assert!(client.is_connected().await);

    let (result, ()) = tokio::join!(client.get_plugin(5), answer_get_plugin(&mut server));
    result.unwrap();
}

#[tokio::test]
async fn unexpected_message_mid_download_closes_session() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("odd.zip");
    let (client, mut server) = pair();
    let cancel = CancellationToken::new();

    let source = Source::default();
    let (result, ()) = tokio::join!(
        client.download_assembly_zip(&source, &target, &cancel),
        async {
            next(&mut server).await;
            server
                .send(&Message::UploadDownloadData(DataChunk {
                    offset: 4,
                    file_size: 8,
                    data: vec![9; 4],
                }))
                .await
                .unwrap();
            let Message::ResponseUploadDownloadData(_) = next(&mut server).await else {
                panic!("expected chunk ack");
            };
            server
                .send(&Message::ServerError(ErrorReport {
                    message: "internal failure".into(),
                }))
                .await
                .unwrap();
        }
    );
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProtocolViolation);
    assert!(!target.exists());
    assert!(!part_of(&target).exists());

    assert!(!client.is_connected().await);
    assert!(server.receive().await.unwrap().is_none());
    let err = client
        .download_assembly_zip(&Source::default(), &target, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotConnected));
}

#[tokio::test]
async fn empty_download_creates_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("empty.bin");
    let (client, mut server) = pair();
    let cancel = CancellationToken::new();

    let resource = ResourceData::default();
    let (result, ()) = tokio::join!(
        client.download_resource_data_file(&resource, &target, &cancel),
        async {
            next(&mut server).await;
            server
                .send(&Message::UploadDownloadData(DataChunk {
                    offset: 0,
                    file_size: 0,
                    data: Vec::new(),
                }))
                .await
                .unwrap();
            next(&mut server).await;
        }
    );
    result.unwrap();
    assert_eq!(std::fs::metadata(&target).unwrap().len(), 0);
}
