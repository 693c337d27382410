// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transaction error taxonomy
//!
//! Every failure a rename can end in, one variant per error code. These are
//! outcomes reported inside a `TransactionResult`, never panics.

use crate::result::RollbackFailure;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of one phase of the rename protocol
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// Bad input, path conflict or scan failure; nothing to clean up
    #[error("plan failed: {reason}")]
    PlanFailed { reason: String },

    /// Staging or WAL write failed; staged files are cleaned up
    #[error("prepare failed{}: {reason}", fmt_path(.path))]
    PrepareFailed { path: Option<PathBuf>, reason: String },

    /// Pre-commit integrity check failed for a reason other than staleness
    #[error("validate failed: {reason}")]
    ValidateFailed { reason: String },

    /// A source file changed after it was planned
    #[error("stale content in {} file(s): {}", .affected_files.len(), fmt_paths(.affected_files))]
    StaleContent { affected_files: Vec<PathBuf> },

    /// Promotion failed partway; completed entries are rolled back
    #[error("commit failed at {}: {reason}", .path.display())]
    CommitFailed { path: PathBuf, reason: String },

    /// Undo itself failed; the WAL is preserved for manual recovery
    #[error("rollback failed for {} entr(ies){}", .failures.len(), fmt_path(.wal_path))]
    RollbackFailed {
        failures: Vec<RollbackFailure>,
        wal_path: Option<PathBuf>,
    },

    #[error("transaction failed: {reason}")]
    Failed { reason: String },
}

fn fmt_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" ({})", p.display()))
        .unwrap_or_default()
}

fn fmt_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl TransactionError {
    pub fn code(&self) -> TransactionErrorCode {
        match self {
            TransactionError::PlanFailed { .. } => TransactionErrorCode::PlanFailed,
            TransactionError::PrepareFailed { .. } => TransactionErrorCode::PrepareFailed,
            TransactionError::ValidateFailed { .. } => TransactionErrorCode::ValidateFailed,
            TransactionError::StaleContent { .. } => TransactionErrorCode::StaleContent,
            TransactionError::CommitFailed { .. } => TransactionErrorCode::CommitFailed,
            TransactionError::RollbackFailed { .. } => TransactionErrorCode::RollbackFailed,
            TransactionError::Failed { .. } => TransactionErrorCode::Failed,
        }
    }

    /// What a caller should do about this failure
    pub fn recovery_action(&self) -> RecoveryAction {
        match self {
            TransactionError::RollbackFailed { .. } => RecoveryAction::ManualRecovery,
            TransactionError::Failed { .. } => RecoveryAction::ContactSupport,
            _ => RecoveryAction::Retry,
        }
    }
}

/// Stable wire codes for transaction failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionErrorCode {
    #[serde(rename = "TRANSACTION_PLAN_FAILED")]
    PlanFailed,
    #[serde(rename = "TRANSACTION_PREPARE_FAILED")]
    PrepareFailed,
    #[serde(rename = "TRANSACTION_VALIDATE_FAILED")]
    ValidateFailed,
    #[serde(rename = "TRANSACTION_STALE_CONTENT")]
    StaleContent,
    #[serde(rename = "TRANSACTION_COMMIT_FAILED")]
    CommitFailed,
    #[serde(rename = "TRANSACTION_ROLLBACK_FAILED")]
    RollbackFailed,
    #[serde(rename = "TRANSACTION_FAILED")]
    Failed,
}

impl TransactionErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionErrorCode::PlanFailed => "TRANSACTION_PLAN_FAILED",
            TransactionErrorCode::PrepareFailed => "TRANSACTION_PREPARE_FAILED",
            TransactionErrorCode::ValidateFailed => "TRANSACTION_VALIDATE_FAILED",
            TransactionErrorCode::StaleContent => "TRANSACTION_STALE_CONTENT",
            TransactionErrorCode::CommitFailed => "TRANSACTION_COMMIT_FAILED",
            TransactionErrorCode::RollbackFailed => "TRANSACTION_ROLLBACK_FAILED",
            TransactionErrorCode::Failed => "TRANSACTION_FAILED",
        }
    }
}

impl fmt::Display for TransactionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recovery hint surfaced with a failed rename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    Retry,
    ManualRecovery,
    ContactSupport,
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryAction::Retry => f.write_str("retry"),
            RecoveryAction::ManualRecovery => f.write_str("manual_recovery"),
            RecoveryAction::ContactSupport => f.write_str("contact_support"),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
