use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

use crate::{CHUNK_SIZE, TransferError};

/// Suffix of the temporary file a download is written to.
pub const PART_SUFFIX: &str = ".part";

/// A slice of file data read for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Byte offset of the first byte of `data`.
    pub start: i64,
    pub data: Vec<u8>,
}

impl Chunk {
    /// Offset just past this chunk, i.e. the cumulative count sent on the wire.
    pub fn end(&self) -> i64 {
        self.start + self.data.len() as i64
    }
}

// ---------------------------------------------------------------------------
// ChunkReader
// ---------------------------------------------------------------------------

/// Reads a file front to back in fixed-size chunks.
///
/// Every chunk except the last is exactly `chunk_size` bytes; short reads
/// from the OS are retried until the chunk is full.
pub struct ChunkReader {
    file: File,
    chunk_size: usize,
    offset: i64,
    file_size: i64,
}

impl ChunkReader {
    /// Opens `path` for chunked reading.
    ///
    /// If `chunk_size` is 0, [`CHUNK_SIZE`] is used.
    pub async fn open(path: &Path, chunk_size: usize) -> Result<Self, TransferError> {
        let file = File::open(path).await?;
        let file_size = file.metadata().await?.len() as i64;
        let chunk_size = if chunk_size == 0 {
            CHUNK_SIZE
        } else {
            chunk_size
        };
        Ok(Self {
            file,
            chunk_size,
            offset: 0,
            file_size,
        })
    }

    /// Reads the next chunk. Returns `None` once `file_size` bytes were read.
    pub async fn next_chunk(&mut self) -> Result<Option<Chunk>, TransferError> {
        let remaining = self.remaining();
        if remaining <= 0 {
            return Ok(None);
        }

        let want = std::cmp::min(remaining as usize, self.chunk_size);
        let mut buf = vec![0u8; want];
        let mut filled = 0;
        while filled < want {
            let n = self.file.read(&mut buf[filled..]).await?;
            if n == 0 {
                return Err(TransferError::Truncated {
                    expected: self.file_size,
                    actual: self.offset + filled as i64,
                });
            }
            filled += n;
        }

        let chunk = Chunk {
            start: self.offset,
            data: buf,
        };
        self.offset = chunk.end();
        Ok(Some(chunk))
    }

    /// Bytes read so far.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// File size recorded at open time.
    pub fn file_size(&self) -> i64 {
        self.file_size
    }

    pub fn remaining(&self) -> i64 {
        self.file_size - self.offset
    }
}

// ---------------------------------------------------------------------------
// PartFile
// ---------------------------------------------------------------------------

/// Returns `<path>.part`.
pub fn part_path(final_path: &Path) -> PathBuf {
    let mut name = OsString::from(final_path.as_os_str());
    name.push(PART_SUFFIX);
    PathBuf::from(name)
}

/// Temporary download target that becomes the final file only on commit.
///
/// The part file is created exclusively. If the writer is dropped without
/// [`commit`](Self::commit) or [`discard`](Self::discard), the part file is
/// removed.
pub struct PartFile {
    file: Option<File>,
    part_path: PathBuf,
    final_path: PathBuf,
    written: i64,
    armed: bool,
}

impl PartFile {
    /// Creates `<final_path>.part`. Fails if the final file already exists.
    pub async fn create(final_path: &Path) -> Result<Self, TransferError> {
        if tokio::fs::try_exists(final_path).await? {
            return Err(TransferError::AlreadyExists(final_path.to_path_buf()));
        }

        let part_path = part_path(final_path);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&part_path)
            .await?;
        debug!(path = %part_path.display(), "part file created");

        Ok(Self {
            file: Some(file),
            part_path,
            final_path: final_path.to_path_buf(),
            written: 0,
            armed: true,
        })
    }

    /// Appends `data` and returns the total bytes written so far.
    pub async fn append(&mut self, data: &[u8]) -> Result<i64, TransferError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| TransferError::InvalidPath("part file already closed".into()))?;
        file.write_all(data).await?;
        self.written += data.len() as i64;
        Ok(self.written)
    }

    pub fn written(&self) -> i64 {
        self.written
    }

    pub fn part_path(&self) -> &Path {
        &self.part_path
    }

    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// Flushes and renames the part file to its final name.
    pub async fn commit(mut self) -> Result<PathBuf, TransferError> {
        if let Some(mut file) = self.file.take() {
            file.flush().await?;
            file.sync_all().await?;
        }
        tokio::fs::rename(&self.part_path, &self.final_path).await?;
        self.armed = false;
        debug!(path = %self.final_path.display(), bytes = self.written, "part file committed");
        Ok(self.final_path.clone())
    }

    /// Closes and deletes the part file.
    pub async fn discard(mut self) -> Result<(), TransferError> {
        drop(self.file.take());
        match tokio::fs::remove_file(&self.part_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.armed = false;
        debug!(path = %self.part_path.display(), "part file discarded");
        Ok(())
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        drop(self.file.take());
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.part_path) {
            Ok(()) => debug!(path = %self.part_path.display(), "unfinished part file removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %self.part_path.display(), error = %e, "failed to remove part file");
            }
        }
    }
}
