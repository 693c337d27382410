// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from file primitives
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to {op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    pub fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        StorageError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            StorageError::Io { path, .. } => path,
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            StorageError::Io { source, .. } => source.kind() == io::ErrorKind::NotFound,
        }
    }
}

/// Errors from the write-ahead log and backup store
#[derive(Debug, Error)]
pub enum WalError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("invalid WAL JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize WAL entry: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("WAL {} is corrupted: checksum {expected:08x}, computed {actual:08x}", .path.display())]
    Corrupted {
        path: PathBuf,
        expected: u32,
        actual: u32,
    },
    #[error("unsupported WAL version {version} in {}", .path.display())]
    UnsupportedVersion { path: PathBuf, version: u32 },
    #[error("invalid backup key: {0}")]
    InvalidBackupKey(String),
}
