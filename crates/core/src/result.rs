// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outcomes handed back to callers: rollback and transaction results

use crate::error::{RecoveryAction, TransactionError, TransactionErrorCode};
use crate::transaction::{EntryKind, Phase};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// An entry rollback handled. `restored` is false when nothing needed undoing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolledBackEntry {
    pub kind: EntryKind,
    pub path: PathBuf,
    pub restored: bool,
}

/// An entry rollback could not undo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackFailure {
    pub kind: EntryKind,
    pub path: PathBuf,
    pub error: String,
}

/// Result of one abort or recovery attempt. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackResult {
    pub success: bool,
    pub rolled_back: Vec<RolledBackEntry>,
    pub failures: Vec<RollbackFailure>,
    pub partial_recovery: bool,
    pub manual_recovery_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_instructions: Option<Vec<String>>,
}

impl RollbackResult {
    /// Assemble a result, generating recovery instructions when undo failed
    pub fn new(
        rolled_back: Vec<RolledBackEntry>,
        failures: Vec<RollbackFailure>,
        wal_path: Option<&Path>,
        backup_dir: Option<&Path>,
    ) -> Self {
        if failures.is_empty() {
            return Self {
                success: true,
                rolled_back,
                failures,
                partial_recovery: false,
                manual_recovery_required: false,
                recovery_instructions: None,
            };
        }

        let instructions = recovery_instructions(&failures, wal_path, backup_dir);
        Self {
            success: false,
            rolled_back,
            failures,
            partial_recovery: true,
            manual_recovery_required: true,
            recovery_instructions: Some(instructions),
        }
    }

    /// Number of entries actually reverted
    pub fn restored_count(&self) -> usize {
        self.rolled_back.iter().filter(|e| e.restored).count()
    }
}

fn recovery_instructions(
    failures: &[RollbackFailure],
    wal_path: Option<&Path>,
    backup_dir: Option<&Path>,
) -> Vec<String> {
    let mut steps = Vec::new();
    match wal_path {
        Some(wal) => steps.push(format!(
            "Inspect the write-ahead log at {} to see the intended rename",
            wal.display()
        )),
        None => steps.push("No write-ahead log was written; inspect the vault directly".to_string()),
    }
    for failure in failures {
        match failure.kind {
            EntryKind::NoteRename => steps.push(format!(
                "Move the note back to {} ({})",
                failure.path.display(),
                failure.error
            )),
            EntryKind::LinkUpdate => steps.push(format!(
                "Restore the original content of {} ({})",
                failure.path.display(),
                failure.error
            )),
        }
    }
    if let Some(dir) = backup_dir {
        steps.push(format!(
            "Pre-transaction copies of every touched file are kept under {}",
            dir.display()
        ));
    }
    steps.push("Delete the write-ahead log once the vault is consistent".to_string());
    steps
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRenameSummary {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkUpdateSummary {
    pub files_updated: usize,
    pub references_updated: usize,
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTiming {
    pub phase: Phase,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMetrics {
    pub total_time_ms: u64,
    pub phase_timings: Vec<PhaseTiming>,
}

impl TransactionMetrics {
    pub fn timing(&self, phase: Phase) -> Option<u64> {
        self.phase_timings
            .iter()
            .find(|t| t.phase == phase)
            .map(|t| t.duration_ms)
    }
}

/// Structured failure detail; never a bare stack trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFailure {
    pub code: TransactionErrorCode,
    pub message: String,
    pub recovery_action: RecoveryAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wal_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recovery_instructions: Vec<String>,
}

impl TransactionFailure {
    pub fn from_error(error: &TransactionError, wal_path: Option<PathBuf>) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
            recovery_action: error.recovery_action(),
            wal_path,
            recovery_instructions: Vec::new(),
        }
    }
}

/// External-facing outcome of `execute`. Built once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub success: bool,
    pub correlation_id: String,
    pub final_phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_rename: Option<NoteRenameSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_updates: Option<LinkUpdateSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback: Option<RollbackResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TransactionFailure>,
    pub metrics: TransactionMetrics,
}

impl TransactionResult {
    pub fn error_code(&self) -> Option<TransactionErrorCode> {
        self.error.as_ref().map(|e| e.code)
    }
}

impl fmt::Display for TransactionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            write!(f, "renamed")?;
        } else {
            write!(f, "rename failed")?;
        }
        if let Some(rename) = &self.note_rename {
            write!(f, ": {} -> {}", rename.from.display(), rename.to.display())?;
        }
        writeln!(f)?;
        writeln!(f, "  transaction: {}", self.correlation_id)?;
        writeln!(f, "  phase: {}", self.final_phase)?;
        if let Some(links) = &self.link_updates {
            writeln!(
                f,
                "  links: {} reference(s) in {} file(s)",
                links.references_updated, links.files_updated
            )?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "  error: {} {}", error.code, error.message)?;
            writeln!(f, "  action: {}", error.recovery_action)?;
            if let Some(wal) = &error.wal_path {
                writeln!(f, "  wal: {}", wal.display())?;
            }
            for (i, step) in error.recovery_instructions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, step)?;
            }
        }
        if let Some(rollback) = &self.rollback {
            writeln!(
                f,
                "  rollback: {} restored, {} failed",
                rollback.restored_count(),
                rollback.failures.len()
            )?;
        }
        write!(f, "  time: {}ms", self.metrics.total_time_ms)
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
