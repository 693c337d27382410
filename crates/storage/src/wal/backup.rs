// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pre-staging backups, kept beside the WAL under `backups/{correlation_id}/`

use super::WriteAheadLog;
use crate::atomic::{atomic_write, read_with_retry};
use crate::error::{StorageError, WalError};
use lv_core::vault_relative;
use std::path::{Component, Path, PathBuf};

impl WriteAheadLog {
    /// Backup location for a vault-relative file
    pub fn backup_path(&self, correlation_id: &str, rel: &Path) -> Result<PathBuf, WalError> {
        let mut components = Path::new(correlation_id).components();
        let valid_id = matches!(components.next(), Some(Component::Normal(_)))
            && components.next().is_none();
        if !valid_id {
            return Err(WalError::InvalidBackupKey(correlation_id.to_string()));
        }
        let rel = vault_relative(rel)
            .map_err(|e| WalError::InvalidBackupKey(format!("{}: {e}", rel.display())))?;
        Ok(self.backup_dir(correlation_id).join(rel))
    }

    /// Store the original content of `rel` before a transaction stages over it
    pub async fn write_backup(
        &self,
        correlation_id: &str,
        rel: &Path,
        content: &str,
    ) -> Result<PathBuf, WalError> {
        let path = self.backup_path(correlation_id, rel)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io("create", parent, e))?;
        }
        atomic_write(&path, content.as_bytes(), &self.policy).await?;
        Ok(path)
    }

    pub async fn read_backup(&self, correlation_id: &str, rel: &Path) -> Result<String, WalError> {
        let path = self.backup_path(correlation_id, rel)?;
        Ok(read_with_retry(&path, &self.policy).await?)
    }

    /// Remove every backup of a transaction. Missing backups are not an error.
    pub async fn remove_backups(&self, correlation_id: &str) -> Result<(), WalError> {
        // Validates the id before anything is deleted
        self.backup_path(correlation_id, Path::new("_"))?;
        let dir = self.backup_dir(correlation_id);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io("remove", &dir, e).into()),
        }
    }
}
