use std::path::Path;

use crate::TransferError;
use crate::chunked::part_path;

/// Checks that `path` is a readable regular file and returns its size.
pub async fn validate_upload_source(path: &Path) -> Result<i64, TransferError> {
    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_file() {
        return Err(TransferError::InvalidPath(format!(
            "not a regular file: {}",
            path.display()
        )));
    }
    Ok(metadata.len() as i64)
}

/// Checks that a download may be written to `path`.
///
/// Rejects:
/// - Paths without a file name (`/`, `..`)
/// - An existing file at `path`
/// - A leftover `<path>.part`
/// - A parent that is not an existing directory
pub async fn validate_download_target(path: &Path) -> Result<(), TransferError> {
    if path.file_name().is_none() {
        return Err(TransferError::InvalidPath(format!(
            "no file name in {}",
            path.display()
        )));
    }

    if tokio::fs::try_exists(path).await? {
        return Err(TransferError::AlreadyExists(path.to_path_buf()));
    }

    let part = part_path(path);
    if tokio::fs::try_exists(&part).await? {
        return Err(TransferError::AlreadyExists(part));
    }

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match tokio::fs::metadata(parent).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(TransferError::InvalidPath(format!(
            "parent is not a directory: {}",
            parent.display()
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(TransferError::InvalidPath(
            format!("parent directory does not exist: {}", parent.display()),
        )),
        Err(e) => Err(e.into()),
    }
}

/// File name used in progress samples and log lines.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
