//! Chunked file transfer with progress sampling.
//!
//! Everything here touches only the local filesystem and clock; the
//! message exchange that drives it lives in the client crate.

mod chunked;
mod progress;
mod types;
mod validation;

use std::path::PathBuf;

pub use chunked::{Chunk, ChunkReader, PART_SUFFIX, PartFile, part_path};
pub use progress::{PROGRESS_INTERVAL, ProgressReporter, ThroughputSampler, TransferProgress};
pub use types::{TransferPhase, TransferState};
pub use validation::{display_name, validate_download_target, validate_upload_source};

/// Chunk size used for every transfer: 64 KiB.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("File {} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("file shrank while reading: expected {expected} bytes, got {actual}")]
    Truncated { expected: i64, actual: i64 },
}
