// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forward phases of the rename protocol

use super::{RenameRequest, TransactionManager};
use crate::error::{PhaseFailure, PhaseResult, RewriteError};
use lv_adapters::{ReferenceLocation, ReferenceScanner, VaultFs};
use lv_core::{
    resolve, vault_relative, Clock, ContentHash, IdGen, LinkRename, NoteRef, NoteRename, Phase,
    TransactionError, TransactionManifest, TransactionState,
};
use std::path::{Path, PathBuf};

/// Validated endpoints of a rename request
pub(crate) struct Endpoints {
    pub from: PathBuf,
    pub to: PathBuf,
    pub old: NoteRef,
    pub new: NoteRef,
}

impl<F, S, C, I> TransactionManager<F, S, C, I>
where
    F: VaultFs,
    S: ReferenceScanner,
    C: Clock,
    I: IdGen,
{
    /// Build the manifest. Reads the vault and renders link rewrites but
    /// writes nothing, so failure here needs no cleanup.
    pub async fn plan(
        &self,
        correlation_id: &str,
        request: &RenameRequest,
    ) -> Result<TransactionState, TransactionError> {
        let Endpoints { from, to, old, new } = self.endpoints(request).await?;

        let content = self.fs.read(&self.vault.join(&from)).await.map_err(plan_failed)?;
        let note_rename = NoteRename {
            from: from.clone(),
            to: to.clone(),
            sha256_before: ContentHash::of(&content),
            completed: false,
        };

        let link_updates = if request.update_links {
            let locations = self.references(&old, &from).await?;
            let output = self
                .rewriter
                .render(&LinkRename::new(old, new), &locations)
                .await
                .map_err(plan_failed)?;
            output.into_link_updates()
        } else {
            Vec::new()
        };

        let manifest = TransactionManifest::new(note_rename, link_updates);
        tracing::info!(
            phase = %Phase::Plan,
            operations = manifest.total_operations,
            references = manifest.total_references(),
            "planned"
        );
        Ok(TransactionState::new(
            correlation_id,
            self.clock.now(),
            self.vault.clone(),
            manifest,
        ))
    }

    /// Persist the WAL, back up every source file and stage new link content
    /// beside its target. Nothing live changes.
    pub async fn prepare(&self, mut state: TransactionState) -> PhaseResult {
        if let Err(e) = state.transition(Phase::Prepare) {
            return Err(PhaseFailure::new(state, e));
        }

        // Staged names are fixed before the WAL is written so a crash
        // mid-staging leaves temp files recovery can find
        for update in &mut state.manifest.link_updates {
            update.staged_path = Some(lv_storage::temp_path_for(&update.path));
        }

        match self.wal.persist(&state).await {
            Ok(path) => state.wal_path = Some(path),
            Err(e) => {
                let error = TransactionError::PrepareFailed {
                    path: None,
                    reason: format!("WAL write failed: {e}"),
                };
                return Err(PhaseFailure::new(state, error));
            }
        }

        if let Err(error) = self.write_backups(&state).await {
            return Err(PhaseFailure::new(state, error));
        }

        let mut staged = Vec::new();
        let mut failure = None;
        for update in &state.manifest.link_updates {
            let (Some(staged_path), Some(content)) = (&update.staged_path, &update.rendered_content)
            else {
                failure = Some(TransactionError::PrepareFailed {
                    path: Some(update.path.clone()),
                    reason: "no rendered content to stage".to_string(),
                });
                break;
            };
            match self.rewriter.stage(staged_path, content).await {
                Ok(()) => {
                    tracing::debug!(path = %update.path.display(), staged = %staged_path.display(), "staged");
                    staged.push(staged_path.clone());
                }
                Err(e) => {
                    failure = Some(TransactionError::PrepareFailed {
                        path: Some(update.path.clone()),
                        reason: e.to_string(),
                    });
                    break;
                }
            }
        }

        if let Some(error) = failure {
            self.remove_staged(&state.vault_path, &staged).await;
            return Err(PhaseFailure::new(state, error));
        }

        tracing::info!(phase = %Phase::Prepare, staged = staged.len(), "prepared");
        Ok(state)
    }

    async fn write_backups(&self, state: &TransactionState) -> Result<(), TransactionError> {
        let note = &state.manifest.note_rename;
        let sources = std::iter::once((&note.from, &note.sha256_before)).chain(
            state
                .manifest
                .link_updates
                .iter()
                .map(|u| (&u.path, &u.sha256_before)),
        );

        let mut stale = Vec::new();
        for (rel, expected) in sources {
            let prepare_failed = |reason: String| TransactionError::PrepareFailed {
                path: Some(rel.clone()),
                reason,
            };
            let abs = resolve(&state.vault_path, rel).map_err(|e| prepare_failed(e.to_string()))?;
            let content = match self.fs.read(&abs).await {
                Ok(content) => content,
                Err(e) if e.is_not_found() => {
                    stale.push(rel.clone());
                    continue;
                }
                Err(e) => return Err(prepare_failed(e.to_string())),
            };
            if !expected.matches(&content) {
                stale.push(rel.clone());
                continue;
            }
            self.wal
                .write_backup(&state.correlation_id, rel, &content)
                .await
                .map_err(|e| prepare_failed(format!("backup failed: {e}")))?;
        }

        if stale.is_empty() {
            Ok(())
        } else {
            Err(TransactionError::StaleContent {
                affected_files: stale,
            })
        }
    }

    /// Re-hash every source file against its planned digest
    pub async fn validate(&self, mut state: TransactionState) -> PhaseResult {
        if let Err(e) = state.transition(Phase::Validate) {
            return Err(PhaseFailure::new(state, e));
        }

        let note = &state.manifest.note_rename;
        let mut checks = vec![(note.from.clone(), note.sha256_before.clone())];
        checks.extend(
            state
                .manifest
                .link_updates
                .iter()
                .map(|u| (u.path.clone(), u.sha256_before.clone())),
        );

        let mut stale = Vec::new();
        for (rel, expected) in checks {
            match self.rewriter.check_fresh(&rel, &expected).await {
                Ok(()) => {}
                Err(RewriteError::Stale(path)) => stale.push(path),
                Err(e) => {
                    let error = TransactionError::ValidateFailed {
                        reason: e.to_string(),
                    };
                    return Err(PhaseFailure::new(state, error));
                }
            }
        }

        if !stale.is_empty() {
            tracing::warn!(files = stale.len(), "stale content detected");
            let error = TransactionError::StaleContent {
                affected_files: stale,
            };
            return Err(PhaseFailure::new(state, error));
        }

        let to = state.manifest.note_rename.to.clone();
        match self.fs.exists(&state.vault_path.join(&to)).await {
            Ok(false) => {}
            Ok(true) => {
                let error = TransactionError::ValidateFailed {
                    reason: format!("destination {} appeared after planning", to.display()),
                };
                return Err(PhaseFailure::new(state, error));
            }
            Err(e) => {
                let error = TransactionError::ValidateFailed {
                    reason: e.to_string(),
                };
                return Err(PhaseFailure::new(state, error));
            }
        }

        tracing::info!(phase = %Phase::Validate, "validated");
        Ok(state)
    }

    /// Promote the note rename, then each staged link file, in order.
    /// The WAL is re-persisted after every completed entry.
    pub async fn commit(&self, mut state: TransactionState) -> PhaseResult {
        if let Err(e) = state.transition(Phase::Commit) {
            return Err(PhaseFailure::new(state, e));
        }
        if let Err(e) = self.wal.persist(&state).await {
            let error = TransactionError::CommitFailed {
                path: state.manifest.note_rename.from.clone(),
                reason: format!("WAL write failed: {e}"),
            };
            return Err(PhaseFailure::new(state, error));
        }

        if let Err(error) = self.promote_note(&state).await {
            return Err(PhaseFailure::new(state, error));
        }
        state.manifest.note_rename.completed = true;
        if let Err(error) = self.checkpoint(&state).await {
            return Err(PhaseFailure::new(state, error));
        }

        for i in 0..state.manifest.link_updates.len() {
            if let Err(error) = self.promote_link(&state, i).await {
                return Err(PhaseFailure::new(state, error));
            }
            state.manifest.link_updates[i].completed = true;
            if let Err(error) = self.checkpoint(&state).await {
                return Err(PhaseFailure::new(state, error));
            }
        }

        tracing::info!(
            phase = %Phase::Commit,
            completed = state.manifest.completed_operations(),
            "committed"
        );
        Ok(state)
    }

    async fn promote_note(&self, state: &TransactionState) -> Result<(), TransactionError> {
        let note = &state.manifest.note_rename;
        let commit_failed = |reason: String| TransactionError::CommitFailed {
            path: note.from.clone(),
            reason,
        };
        let from = resolve(&state.vault_path, &note.from).map_err(|e| commit_failed(e.to_string()))?;
        let to = resolve(&state.vault_path, &note.to).map_err(|e| commit_failed(e.to_string()))?;

        if let Some(parent) = to.parent() {
            self.fs
                .create_dir_all(parent)
                .await
                .map_err(|e| commit_failed(e.to_string()))?;
        }
        // A file created at the destination since validate fails the commit
        self.fs
            .rename_no_clobber(&from, &to)
            .await
            .map_err(|e| commit_failed(e.to_string()))?;
        tracing::debug!(from = %note.from.display(), to = %note.to.display(), "note renamed");
        Ok(())
    }

    async fn promote_link(&self, state: &TransactionState, index: usize) -> Result<(), TransactionError> {
        let update = &state.manifest.link_updates[index];
        let Some(staged) = &update.staged_path else {
            return Err(TransactionError::CommitFailed {
                path: update.path.clone(),
                reason: "entry was never staged".to_string(),
            });
        };

        match self.rewriter.check_fresh(&update.path, &update.sha256_before).await {
            Ok(()) => {}
            Err(RewriteError::Stale(path)) => {
                return Err(TransactionError::StaleContent {
                    affected_files: vec![path],
                })
            }
            Err(e) => {
                return Err(TransactionError::CommitFailed {
                    path: update.path.clone(),
                    reason: e.to_string(),
                })
            }
        }

        self.rewriter
            .promote(staged, &update.path)
            .await
            .map_err(|e| TransactionError::CommitFailed {
                path: update.path.clone(),
                reason: e.to_string(),
            })?;
        tracing::debug!(path = %update.path.display(), "link update promoted");
        Ok(())
    }

    /// Record completion progress in the WAL
    async fn checkpoint(&self, state: &TransactionState) -> Result<(), TransactionError> {
        self.wal
            .persist(state)
            .await
            .map(|_| ())
            .map_err(|e| TransactionError::CommitFailed {
                path: state.wal_path.clone().unwrap_or_default(),
                reason: format!("WAL checkpoint failed: {e}"),
            })
    }

    /// Delete the WAL, then backups and any staged leftovers. Cleanup
    /// failures are logged and never change the outcome.
    pub async fn success(&self, mut state: TransactionState) -> TransactionState {
        if let Err(e) = state.transition(Phase::Success) {
            tracing::warn!(error = %e, "unexpected phase at success");
            state.phase = Phase::Success;
        }
        self.cleanup(&state).await;
        tracing::info!(phase = %Phase::Success, "transaction complete");
        state
    }

    /// Remove everything a transaction leaves outside the live vault files.
    ///
    /// Deleting the WAL is the commit point. Backups go only after it, so
    /// a surviving WAL can always be rolled back in full.
    async fn cleanup(&self, state: &TransactionState) {
        if let Some(wal_path) = &state.wal_path {
            if let Err(e) = self.wal.delete(wal_path).await {
                tracing::warn!(wal = %wal_path.display(), error = %e, "failed to delete WAL, keeping backups");
                return;
            }
        }

        let staged: Vec<PathBuf> = state
            .manifest
            .link_updates
            .iter()
            .filter_map(|u| u.staged_path.clone())
            .collect();
        self.remove_staged(&state.vault_path, &staged).await;

        if let Err(e) = self.wal.remove_backups(&state.correlation_id).await {
            tracing::warn!(error = %e, "failed to remove backups");
        }
    }

    pub(crate) async fn remove_staged(&self, vault: &Path, staged: &[PathBuf]) {
        for rel in staged {
            let Ok(abs) = resolve(vault, rel) else {
                tracing::warn!(path = %rel.display(), "refusing to remove staged path outside vault");
                continue;
            };
            if let Err(e) = self.fs.remove(&abs).await {
                tracing::warn!(path = %rel.display(), error = %e, "failed to remove staged file");
            }
        }
    }

    /// Normalize both request paths and check the rename is possible
    pub(crate) async fn endpoints(
        &self,
        request: &RenameRequest,
    ) -> Result<Endpoints, TransactionError> {
        let from = self.request_path(&request.from)?;
        let to = self.request_path(&request.to)?;
        if from == to {
            return Err(plan_failed("source and destination are the same path"));
        }
        let old = NoteRef::from_path(&from)
            .ok_or_else(|| plan_failed(format!("{} is not a markdown note", from.display())))?;
        let new = NoteRef::from_path(&to)
            .ok_or_else(|| plan_failed(format!("{} is not a markdown note", to.display())))?;

        if !self.fs.is_file(&self.vault.join(&from)).await.map_err(plan_failed)? {
            return Err(plan_failed(format!("source note {} does not exist", from.display())));
        }
        if self.fs.exists(&self.vault.join(&to)).await.map_err(plan_failed)? {
            return Err(plan_failed(format!("destination {} already exists", to.display())));
        }
        Ok(Endpoints { from, to, old, new })
    }

    /// Files referencing `old`, minus the note itself
    pub(crate) async fn references(
        &self,
        old: &NoteRef,
        from: &Path,
    ) -> Result<Vec<ReferenceLocation>, TransactionError> {
        let mut locations = self.scanner.scan_references(old).await.map_err(plan_failed)?;
        // The note keeps its own content; self-links are not rewritten
        locations.retain(|l| vault_relative(&l.path).map_or(true, |p| p != from));
        Ok(locations)
    }

    fn request_path(&self, path: &Path) -> Result<PathBuf, TransactionError> {
        let rel = if path.is_absolute() {
            path.strip_prefix(&self.vault)
                .map_err(|_| plan_failed(format!("{} is outside the vault", path.display())))?
        } else {
            path
        };
        vault_relative(rel).map_err(plan_failed)
    }
}

pub(crate) fn plan_failed(reason: impl ToString) -> TransactionError {
    TransactionError::PlanFailed {
        reason: reason.to_string(),
    }
}
