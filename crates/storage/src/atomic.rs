// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic file operations
//!
//! Every write goes to a uniquely named sibling temp file which is then
//! renamed over the target. Rename is the only step relied on for atomicity.

use crate::error::StorageError;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// "Device or resource busy", reported by sync agents holding a file lock
const EBUSY: i32 = 16;

/// Retry schedule for transient I/O stalls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            delay: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    pub const fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    /// Single attempt, no retries
    pub const fn none() -> Self {
        Self {
            retries: 0,
            delay: Duration::ZERO,
        }
    }

    /// Linear backoff: the nth retry waits n * delay
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.delay.saturating_mul(attempt)
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or
    /// retries are exhausted. The last error is returned.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> io::Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = io::Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.retries && is_transient(&e) => {
                    attempt += 1;
                    tracing::debug!(attempt, error = %e, "transient I/O error, retrying");
                    tokio::time::sleep(self.delay_for(attempt)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Errors worth retrying: lock contention and interrupted calls
pub fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
            | io::ErrorKind::PermissionDenied
    ) || err.raw_os_error() == Some(EBUSY)
}

/// Unique sibling temp path: `.{file}.{uuid}.tmp` in the same directory
pub fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = format!(".{}.{}.tmp", name, uuid::Uuid::new_v4().simple());
    match path.parent() {
        Some(parent) => parent.join(tmp),
        None => PathBuf::from(tmp),
    }
}

/// Whether a file name looks like one produced by [`temp_path_for`]
pub fn is_temp_name(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(".tmp")
}

/// Write `content` to `path` atomically. Each retry redoes the whole
/// write and rename with a fresh temp file; no temp file survives a failure.
pub async fn atomic_write(
    path: &Path,
    content: &[u8],
    policy: &RetryPolicy,
) -> Result<(), StorageError> {
    policy
        .run(|| write_once(path, content))
        .await
        .map_err(|e| StorageError::io("write", path, e))
}

async fn write_once(path: &Path, content: &[u8]) -> io::Result<()> {
    let tmp = temp_path_for(path);
    match write_and_rename(&tmp, path, content).await {
        Ok(()) => {
            sync_parent(path).await;
            Ok(())
        }
        Err(e) => {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(tmp = %tmp.display(), error = %cleanup, "failed to remove temp file");
                }
            }
            Err(e)
        }
    }
}

async fn write_and_rename(tmp: &Path, path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(tmp)
        .await?;
    file.write_all(content).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(tmp, path).await
}

/// Best-effort fsync of the containing directory so the rename is durable
async fn sync_parent(path: &Path) {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return;
    };
    if let Ok(dir) = tokio::fs::File::open(parent).await {
        if let Err(e) = dir.sync_all().await {
            tracing::debug!(dir = %parent.display(), error = %e, "directory fsync failed");
        }
    }
}

/// Read a UTF-8 file, retrying transient errors
pub async fn read_with_retry(path: &Path, policy: &RetryPolicy) -> Result<String, StorageError> {
    policy
        .run(|| tokio::fs::read_to_string(path))
        .await
        .map_err(|e| StorageError::io("read", path, e))
}

/// Rename `from` onto `to`, retrying transient errors
pub async fn rename_with_retry(
    from: &Path,
    to: &Path,
    policy: &RetryPolicy,
) -> Result<(), StorageError> {
    policy
        .run(|| tokio::fs::rename(from, to))
        .await
        .map_err(|e| StorageError::io("rename", from, e))?;
    sync_parent(to).await;
    Ok(())
}

/// Move `from` to `to`, failing with `AlreadyExists` instead of replacing
/// a file at `to`. Hard link then unlink; where hard links are not
/// supported it falls back to an existence check and a plain rename.
pub async fn rename_no_clobber(
    from: &Path,
    to: &Path,
    policy: &RetryPolicy,
) -> Result<(), StorageError> {
    match policy.run(|| tokio::fs::hard_link(from, to)).await {
        Ok(()) => {}
        Err(e) if matches!(e.kind(), io::ErrorKind::AlreadyExists | io::ErrorKind::NotFound) => {
            return Err(StorageError::io("rename", from, e));
        }
        Err(e) => {
            tracing::debug!(from = %from.display(), error = %e, "hard link failed, using plain rename");
            if exists(to).await? {
                return Err(StorageError::io("rename", from, io::ErrorKind::AlreadyExists.into()));
            }
            return rename_with_retry(from, to, policy).await;
        }
    }

    if let Err(e) = remove_if_exists(from, policy).await {
        // Leave exactly one copy behind
        if let Err(undo) = tokio::fs::remove_file(to).await {
            tracing::warn!(path = %to.display(), error = %undo, "failed to remove new link");
        }
        return Err(e);
    }
    sync_parent(to).await;
    Ok(())
}

/// Remove a file. Returns false if it was already gone.
pub async fn remove_if_exists(path: &Path, policy: &RetryPolicy) -> Result<bool, StorageError> {
    match policy.run(|| tokio::fs::remove_file(path)).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StorageError::io("remove", path, e)),
    }
}

pub async fn exists(path: &Path) -> Result<bool, StorageError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| StorageError::io("stat", path, e))
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
