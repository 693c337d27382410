// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Boot-time recovery of abandoned transactions.
//!
//! Every WAL older than the grace window whose owning process is gone is
//! rolled back. Nothing here returns an error: a WAL that cannot be read
//! or undone is reported and left on disk, and startup continues.

use crate::manager::TransactionManager;
use lv_adapters::{ReferenceScanner, VaultFs};
use lv_core::{Clock, IdGen, RollbackResult};
use lv_storage::{PendingWal, RENAME_OPERATION};
use serde::Serialize;
use std::path::PathBuf;
use tracing::Instrument;

/// Result of recovering one WAL file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecoveryOutcome {
    pub wal_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    pub success: bool,
    /// The WAL was already gone: an earlier run finished the job
    pub already_recovered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollback: Option<RollbackResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecoveryOutcome {
    fn failed(wal_path: PathBuf, correlation_id: Option<String>, error: impl Into<String>) -> Self {
        Self {
            wal_path,
            correlation_id,
            success: false,
            already_recovered: false,
            rollback: None,
            error: Some(error.into()),
        }
    }
}

/// Summary of a boot scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecoveryReport {
    pub scanned: usize,
    pub recovered: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_error: Option<String>,
    pub outcomes: Vec<RecoveryOutcome>,
}

impl RecoveryReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.scan_error.is_none()
    }
}

impl<F, S, C, I> TransactionManager<F, S, C, I>
where
    F: VaultFs,
    S: ReferenceScanner,
    C: Clock,
    I: IdGen,
{
    /// Roll back one abandoned transaction and delete its WAL if that
    /// fully succeeded
    pub async fn recover_from_wal(&self, pending: &PendingWal) -> RecoveryOutcome {
        let wal_path = pending.path.clone();
        match lv_storage::exists(&wal_path).await {
            Ok(false) => {
                tracing::debug!(wal = %wal_path.display(), "WAL already recovered");
                return RecoveryOutcome {
                    wal_path,
                    correlation_id: pending.entry.as_ref().ok().map(|e| e.correlation_id.clone()),
                    success: true,
                    already_recovered: true,
                    rollback: None,
                    error: None,
                };
            }
            Ok(true) => {}
            Err(e) => return RecoveryOutcome::failed(wal_path, None, e.to_string()),
        }

        let entry = match &pending.entry {
            Ok(entry) => entry.clone(),
            Err(e) => {
                tracing::error!(wal = %wal_path.display(), error = %e, "unreadable WAL left for manual recovery");
                return RecoveryOutcome::failed(wal_path, None, e.clone());
            }
        };
        let correlation_id = Some(entry.correlation_id.clone());
        if entry.operation != RENAME_OPERATION {
            return RecoveryOutcome::failed(
                wal_path,
                correlation_id,
                format!("unsupported operation {:?}", entry.operation),
            );
        }
        if let Err(e) = entry.manifest.validate_paths() {
            return RecoveryOutcome::failed(wal_path, correlation_id, format!("unsafe path in WAL: {e}"));
        }

        let state = entry.into_state(wal_path.clone());
        let span = tracing::info_span!(
            "recover",
            correlation_id = %state.correlation_id,
            phase = %state.phase,
        );
        let rollback = self.rollback(&state).instrument(span).await;
        if !rollback.success {
            return RecoveryOutcome {
                wal_path,
                correlation_id,
                success: false,
                already_recovered: false,
                error: Some(format!("{} entr(ies) could not be undone", rollback.failures.len())),
                rollback: Some(rollback),
            };
        }

        if let Err(e) = self.wal().delete(&wal_path).await {
            tracing::warn!(wal = %wal_path.display(), error = %e, "rolled back but failed to delete WAL");
        }
        tracing::info!(
            correlation_id = %state.correlation_id,
            restored = rollback.restored_count(),
            "recovered abandoned transaction"
        );
        RecoveryOutcome {
            wal_path,
            correlation_id,
            success: true,
            already_recovered: false,
            rollback: Some(rollback),
            error: None,
        }
    }

    /// Scan the WAL directory and recover every abandoned transaction,
    /// oldest first
    pub async fn recover_pending(&self) -> RecoveryReport {
        let wal = self.wal();
        let pending = match wal
            .scan_pending(self.clock().now(), self.config().grace_window, Some(wal.pid()))
            .await
        {
            Ok(pending) => pending,
            Err(e) => {
                tracing::error!(error = %e, "WAL scan failed");
                return RecoveryReport {
                    scan_error: Some(e.to_string()),
                    ..RecoveryReport::default()
                };
            }
        };

        let mut report = RecoveryReport {
            scanned: pending.len(),
            ..RecoveryReport::default()
        };
        for wal in &pending {
            let outcome = self.recover_from_wal(wal).await;
            if outcome.success {
                report.recovered += 1;
            } else {
                report.failed += 1;
            }
            report.outcomes.push(outcome);
        }

        if report.scanned > 0 {
            tracing::info!(
                scanned = report.scanned,
                recovered = report.recovered,
                failed = report.failed,
                "boot recovery finished"
            );
        }
        report
    }
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
