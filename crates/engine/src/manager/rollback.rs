// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Abort and rollback.
//!
//! Rollback walks the manifest in reverse commit order. An entry is undone
//! when it is marked completed, or when the filesystem shows it was promoted
//! after the last WAL checkpoint. Running it again on an already restored
//! vault changes nothing.

use super::TransactionManager;
use lv_adapters::{ReferenceScanner, VaultFs};
use lv_core::{
    resolve, Clock, ContentHash, EntryKind, IdGen, LinkUpdate, NoteRename, Phase, RollbackFailure,
    RollbackResult, RolledBackEntry, TransactionError, TransactionState,
};

/// What happened to one entry. `None` means it never took effect.
type Undo = Result<Option<bool>, String>;

impl<F, S, C, I> TransactionManager<F, S, C, I>
where
    F: VaultFs,
    S: ReferenceScanner,
    C: Clock,
    I: IdGen,
{
    /// Move the transaction to `abort` and undo whatever it promoted.
    ///
    /// The WAL is deleted only if every undo succeeded; otherwise it is
    /// re-persisted in the `abort` phase as the manual-recovery artifact.
    pub async fn abort(
        &self,
        mut state: TransactionState,
        error: &TransactionError,
    ) -> (TransactionState, RollbackResult) {
        if let Err(e) = state.transition(Phase::Abort) {
            tracing::warn!(error = %e, "abort from unexpected phase");
            state.phase = Phase::Abort;
        }
        tracing::info!(phase = %Phase::Abort, code = %error.code(), "rolling back");

        let result = self.rollback(&state).await;
        if result.success {
            if let Some(wal_path) = &state.wal_path {
                if let Err(e) = self.wal.delete(wal_path).await {
                    tracing::warn!(wal = %wal_path.display(), error = %e, "failed to delete WAL after rollback");
                }
            }
        } else if state.wal_path.is_some() {
            if let Err(e) = self.wal.persist(&state).await {
                tracing::error!(error = %e, "failed to record abort in WAL");
            }
        }
        (state, result)
    }

    /// Undo every promoted entry of `state`. Staged files and backups are
    /// removed only when the whole undo succeeded. Never fails; problems
    /// are reported in the result.
    pub async fn rollback(&self, state: &TransactionState) -> RollbackResult {
        let mut rolled_back = Vec::new();
        let mut failures = Vec::new();
        let mut record = |kind: EntryKind, path: &std::path::Path, undo: Undo| match undo {
            Ok(Some(restored)) => rolled_back.push(RolledBackEntry {
                kind,
                path: path.to_path_buf(),
                restored,
            }),
            Ok(None) => {}
            Err(error) => {
                tracing::error!(kind = %kind, path = %path.display(), error = %error, "rollback failed");
                failures.push(RollbackFailure {
                    kind,
                    path: path.to_path_buf(),
                    error,
                });
            }
        };

        for update in state.manifest.link_updates.iter().rev() {
            let undo = self.undo_link_update(state, update).await;
            record(EntryKind::LinkUpdate, &update.path, undo);
        }
        let note = &state.manifest.note_rename;
        let undo = self.undo_note_rename(state, note).await;
        record(EntryKind::NoteRename, &note.from, undo);

        let backup_dir = self.wal.backup_dir(&state.correlation_id);
        let result = RollbackResult::new(
            rolled_back,
            failures,
            state.wal_path.as_deref(),
            Some(&backup_dir),
        );

        if result.success {
            let staged: Vec<_> = state
                .manifest
                .link_updates
                .iter()
                .filter_map(|u| u.staged_path.clone())
                .collect();
            self.remove_staged(&state.vault_path, &staged).await;
            if let Err(e) = self.wal.remove_backups(&state.correlation_id).await {
                tracing::warn!(error = %e, "failed to remove backups");
            }
            tracing::info!(restored = result.restored_count(), "rollback complete");
        } else {
            tracing::error!(
                failures = result.failures.len(),
                wal = ?state.wal_path,
                "rollback incomplete, manual recovery required"
            );
        }
        result
    }

    async fn undo_link_update(&self, state: &TransactionState, update: &LinkUpdate) -> Undo {
        let path = resolve(&state.vault_path, &update.path).map_err(|e| e.to_string())?;
        let live = match self.fs.read(&path).await {
            Ok(live) => live,
            Err(e) if e.is_not_found() => {
                if update.completed {
                    return Err("file no longer exists; restore it from the backup".to_string());
                }
                return Ok(None);
            }
            Err(e) => return Err(e.to_string()),
        };

        let live_hash = ContentHash::of(&live);
        if live_hash == update.sha256_before {
            // Never promoted, or already restored by an earlier run
            return Ok(update.completed.then_some(false));
        }
        if live_hash != update.sha256_after {
            if update.completed {
                return Err("modified after commit; refusing to overwrite".to_string());
            }
            // Someone else's edit to a file this transaction never touched
            return Ok(None);
        }

        let original = self
            .wal
            .read_backup(&state.correlation_id, &update.path)
            .await
            .map_err(|e| format!("backup unavailable: {e}"))?;
        if !update.sha256_before.matches(&original) {
            return Err("backup does not match the pre-transaction digest".to_string());
        }
        self.fs
            .write_atomic(&path, &original)
            .await
            .map_err(|e| e.to_string())?;
        tracing::debug!(path = %update.path.display(), "link update restored");
        Ok(Some(true))
    }

    async fn undo_note_rename(&self, state: &TransactionState, note: &NoteRename) -> Undo {
        let from = resolve(&state.vault_path, &note.from).map_err(|e| e.to_string())?;
        let to = resolve(&state.vault_path, &note.to).map_err(|e| e.to_string())?;
        let from_exists = self.fs.exists(&from).await.map_err(|e| e.to_string())?;
        let to_exists = self.fs.exists(&to).await.map_err(|e| e.to_string())?;

        match (from_exists, to_exists) {
            (true, false) => Ok(note.completed.then_some(false)),
            (true, true) => {
                if note.completed {
                    Err(format!(
                        "both {} and {} exist; reconcile them by hand",
                        note.from.display(),
                        note.to.display()
                    ))
                } else {
                    // Destination belongs to someone else
                    Ok(None)
                }
            }
            (false, true) => {
                if !note.completed {
                    // Only undo a rename the WAL did not record if the
                    // destination really is our note
                    let content = self.fs.read(&to).await.map_err(|e| e.to_string())?;
                    if !note.sha256_before.matches(&content) {
                        return Err(format!(
                            "{} is missing and {} holds different content",
                            note.from.display(),
                            note.to.display()
                        ));
                    }
                }
                self.fs
                    .rename(&to, &from)
                    .await
                    .map_err(|e| e.to_string())?;
                tracing::debug!(from = %note.to.display(), to = %note.from.display(), "note rename reverted");
                Ok(Some(true))
            }
            (false, false) => {
                let original = self
                    .wal
                    .read_backup(&state.correlation_id, &note.from)
                    .await
                    .map_err(|e| format!("note missing at both paths and no backup: {e}"))?;
                if !note.sha256_before.matches(&original) {
                    return Err("note backup does not match the pre-transaction digest".to_string());
                }
                self.fs
                    .write_atomic(&from, &original)
                    .await
                    .map_err(|e| e.to_string())?;
                tracing::warn!(path = %note.from.display(), "note restored from backup");
                Ok(Some(true))
            }
        }
    }
}
