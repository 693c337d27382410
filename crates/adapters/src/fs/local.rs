// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local filesystem access backed by lv-storage primitives

use super::{FsError, VaultFs};
use async_trait::async_trait;
use lv_storage::{RetryPolicy, StorageError};
use std::path::Path;

#[derive(Clone, Debug, Default)]
pub struct LocalFs {
    policy: RetryPolicy,
}

impl LocalFs {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl VaultFs for LocalFs {
    async fn read(&self, path: &Path) -> Result<String, FsError> {
        Ok(lv_storage::read_with_retry(path, &self.policy).await?)
    }

    async fn write_atomic(&self, path: &Path, content: &str) -> Result<(), FsError> {
        Ok(lv_storage::atomic_write(path, content.as_bytes(), &self.policy).await?)
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        Ok(lv_storage::rename_with_retry(from, to, &self.policy).await?)
    }

    async fn rename_no_clobber(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        Ok(lv_storage::rename_no_clobber(from, to, &self.policy).await?)
    }

    async fn remove(&self, path: &Path) -> Result<bool, FsError> {
        Ok(lv_storage::remove_if_exists(path, &self.policy).await?)
    }

    async fn exists(&self, path: &Path) -> Result<bool, FsError> {
        Ok(lv_storage::exists(path).await?)
    }

    async fn is_file(&self, path: &Path) -> Result<bool, FsError> {
        match tokio::fs::metadata(path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::io("stat", path, e).into()),
        }
    }

    async fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| StorageError::io("create", path, e).into())
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
