// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log of rename transactions
//!
//! One pretty-printed JSON file per transaction, named
//! `{timestamp}-rename-{correlation_id}.wal.json`, in a directory outside
//! the vault. Persisting again overwrites the same file atomically.

mod backup;
mod entry;

pub use entry::{WalEntry, RENAME_OPERATION, WAL_VERSION};

use crate::atomic::{atomic_write, read_with_retry, remove_if_exists, RetryPolicy};
use crate::error::{StorageError, WalError};
use crate::process::process_exists;
use chrono::{DateTime, Utc};
use lv_core::TransactionState;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const WAL_SUFFIX: &str = ".wal.json";
const BACKUP_DIR: &str = "backups";

/// A WAL file found by a boot scan
#[derive(Debug)]
pub struct PendingWal {
    pub path: PathBuf,
    /// Entry timestamp, or file mtime when the entry could not be read
    pub timestamp: DateTime<Utc>,
    pub entry: Result<WalEntry, String>,
}

/// Handle on the WAL directory. The directory is created on first persist.
#[derive(Debug, Clone)]
pub struct WriteAheadLog {
    dir: PathBuf,
    policy: RetryPolicy,
    pid: u32,
}

impl WriteAheadLog {
    pub fn open(dir: impl Into<PathBuf>, policy: RetryPolicy) -> Self {
        Self {
            dir: dir.into(),
            policy,
            pid: std::process::id(),
        }
    }

    /// Record entries as owned by `pid` instead of the current process
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Deterministic WAL path for a transaction
    pub fn path_for(&self, timestamp: DateTime<Utc>, correlation_id: &str) -> PathBuf {
        self.dir.join(format!(
            "{}-rename-{}{}",
            timestamp.format("%Y-%m-%dT%H-%M-%S%.3fZ"),
            correlation_id,
            WAL_SUFFIX
        ))
    }

    /// Write the state's current manifest and phase, returning the WAL path
    pub async fn persist(&self, state: &TransactionState) -> Result<PathBuf, WalError> {
        let path = match &state.wal_path {
            Some(path) => path.clone(),
            None => self.path_for(state.timestamp, &state.correlation_id),
        };
        let entry = WalEntry::from_state(state, self.pid);
        let json = serde_json::to_string_pretty(&entry).map_err(WalError::Serialize)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StorageError::io("create", &self.dir, e))?;
        atomic_write(&path, json.as_bytes(), &self.policy).await?;
        tracing::debug!(wal = %path.display(), phase = %entry.phase, "persisted WAL");
        Ok(path)
    }

    /// Read and verify a WAL file
    pub async fn read(&self, path: &Path) -> Result<WalEntry, WalError> {
        let json = read_with_retry(path, &self.policy).await?;
        parse_entry(path, &json)
    }

    /// Delete a WAL file; a missing file is not an error
    pub async fn delete(&self, path: &Path) -> Result<(), WalError> {
        if remove_if_exists(path, &self.policy).await? {
            tracing::debug!(wal = %path.display(), "deleted WAL");
        }
        Ok(())
    }

    /// All WAL files in the directory, sorted by name (oldest first)
    pub async fn list(&self) -> Result<Vec<PathBuf>, WalError> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io("list", &self.dir, e).into()),
        };

        let mut paths = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| StorageError::io("list", &self.dir, e))?
        {
            let path = entry.path();
            let is_wal = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(WAL_SUFFIX) && !n.starts_with('.'));
            if is_wal {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// WAL files old enough to be considered abandoned.
    ///
    /// Entries younger than `grace` may belong to a transaction still in
    /// flight elsewhere and are skipped, as are entries owned by `own_pid`
    /// or by any process that is still running. Unreadable entries are returned with their error so recovery can
    /// report them; their age is taken from the file's mtime.
    pub async fn scan_pending(
        &self,
        now: DateTime<Utc>,
        grace: Duration,
        own_pid: Option<u32>,
    ) -> Result<Vec<PendingWal>, WalError> {
        let mut pending = Vec::new();
        for path in self.list().await? {
            let (timestamp, entry) = match self.read(&path).await {
                Ok(entry) => {
                    if own_pid == Some(entry.pid) {
                        tracing::debug!(wal = %path.display(), "skipping WAL owned by this process");
                        continue;
                    }
                    if process_exists(entry.pid) {
                        tracing::info!(wal = %path.display(), pid = entry.pid, "skipping WAL owned by a running process");
                        continue;
                    }
                    (entry.timestamp, Ok(entry))
                }
                Err(e) => match modified_at(&path).await {
                    Some(mtime) => (mtime, Err(e.to_string())),
                    None => continue,
                },
            };

            let age = (now - timestamp).to_std().unwrap_or(Duration::ZERO);
            if age < grace {
                tracing::debug!(wal = %path.display(), age_ms = age.as_millis() as u64, "WAL inside grace window");
                continue;
            }
            pending.push(PendingWal {
                path,
                timestamp,
                entry,
            });
        }
        pending.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.path.cmp(&b.path)));
        Ok(pending)
    }

    /// Directory holding one transaction's backups
    pub fn backup_dir(&self, correlation_id: &str) -> PathBuf {
        self.dir.join(BACKUP_DIR).join(correlation_id)
    }
}

#[derive(Deserialize)]
struct VersionTag {
    version: u32,
}

fn parse_entry(path: &Path, json: &str) -> Result<WalEntry, WalError> {
    let parse_err = |source| WalError::Parse {
        path: path.to_path_buf(),
        source,
    };
    let tag: VersionTag = serde_json::from_str(json).map_err(parse_err)?;
    if tag.version != WAL_VERSION {
        return Err(WalError::UnsupportedVersion {
            path: path.to_path_buf(),
            version: tag.version,
        });
    }

    let entry: WalEntry = serde_json::from_str(json).map_err(parse_err)?;
    let actual = WalEntry::calculate_checksum(&entry.manifest);
    if actual != entry.checksum {
        return Err(WalError::Corrupted {
            path: path.to_path_buf(),
            expected: entry.checksum,
            actual,
        });
    }
    Ok(entry)
}

async fn modified_at(path: &Path) -> Option<DateTime<Utc>> {
    let meta = tokio::fs::metadata(path).await.ok()?;
    meta.modified().ok().map(DateTime::<Utc>::from)
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
