// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Vault file access

mod local;

pub use local::LocalFs;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod faulty;
#[cfg(any(test, feature = "test-support"))]
pub use faulty::{FaultyFs, FsCall, FsOp};

use async_trait::async_trait;
use lv_storage::StorageError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from vault file operations
#[derive(Debug, Error)]
pub enum FsError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("injected {op} failure on {}", .path.display())]
    Injected { op: &'static str, path: PathBuf },
}

impl FsError {
    pub fn is_not_found(&self) -> bool {
        match self {
            FsError::Storage(e) => e.is_not_found(),
            FsError::Injected { .. } => false,
        }
    }
}

/// File operations the rename engine performs on the vault.
///
/// Implementations retry transient sync-lock errors themselves; callers
/// never loop.
#[async_trait]
pub trait VaultFs: Clone + Send + Sync + 'static {
    /// Read a UTF-8 file
    async fn read(&self, path: &Path) -> Result<String, FsError>;

    /// Replace `path` with `content` via temp file and rename
    async fn write_atomic(&self, path: &Path, content: &str) -> Result<(), FsError>;

    /// Rename `from` onto `to`
    async fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError>;

    /// Move `from` to `to`, failing if something already exists at `to`
    async fn rename_no_clobber(&self, from: &Path, to: &Path) -> Result<(), FsError>;

    /// Remove a file, returning false if it did not exist
    async fn remove(&self, path: &Path) -> Result<bool, FsError>;

    async fn exists(&self, path: &Path) -> Result<bool, FsError>;

    /// True only for regular files
    async fn is_file(&self, path: &Path) -> Result<bool, FsError>;

    async fn create_dir_all(&self, path: &Path) -> Result<(), FsError>;
}
