//! Shared read/write helpers for the JSON-file stores.

use serde::{de::DeserializeOwned, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::server::error::store::StoreError;

/// Result of reading a JSON file.
#[derive(Debug)]
pub enum JsonRead<T> {
    /// File does not exist or is blank.
    Missing,
    /// File could not be read at all; writers must fail rather than replace it.
    Unreadable(std::io::Error),
    /// File was read but does not decode. Its contents must not be overwritten.
    Corrupt,
    Parsed(T),
}

/// Reads and decodes a JSON file.
///
/// A missing file is normal (first run) and logged at debug level. Unreadable or malformed
/// files are logged as warnings. Neither case is an error to the caller.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> JsonRead<T> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("{} does not exist yet, starting empty", path.display());
            return JsonRead::Missing;
        }
        Err(e) => {
            tracing::warn!("Failed to read {}, treating as empty: {}", path.display(), e);
            return JsonRead::Unreadable(e);
        }
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return JsonRead::Missing;
    }

    match serde_json::from_slice(&bytes) {
        Ok(value) => JsonRead::Parsed(value),
        Err(e) => {
            tracing::warn!("{} is corrupt, treating as empty: {}", path.display(), e);
            JsonRead::Corrupt
        }
    }
}

/// Moves `path` to `<name>.<label>-<unix time>` so a fresh file can take its place.
///
/// # Returns
/// - `Ok(PathBuf)` - Where the old file now lives
/// - `Err(StoreError::Io)` - Rename failed; the caller must not write over `path`
pub async fn set_aside(path: &Path, label: &str) -> Result<PathBuf, StoreError> {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}-{}", label, chrono::Utc::now().timestamp()));
    let target = path.with_file_name(name);

    tokio::fs::rename(path, &target)
        .await
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::warn!("Moved {} to {}", path.display(), target.display());

    Ok(target)
}

/// Encodes `value` and replaces `path` with it.
///
/// The payload goes to a temporary file in the target directory, is flushed to disk, then
/// persisted over the target, so a concurrent reader sees either the old or the new
/// contents. The temporary file is removed on every failure path.
///
/// # Returns
/// - `Ok(())` - File replaced
/// - `Err(StoreError::Encode)` - Value could not be serialized
/// - `Err(StoreError::Io)` - Directory, temporary file or rename failed
pub async fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Encode {
        path: path.to_path_buf(),
        source,
    })?;

    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic(&target, &payload))
        .await
        .map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::other(e),
        })?
}

fn write_atomic(path: &Path, payload: &[u8]) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(io_err)?;

    let mut temp = NamedTempFile::new_in(parent).map_err(io_err)?;
    temp.write_all(payload).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|e| io_err(e.error))?;

    Ok(())
}
