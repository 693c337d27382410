// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run context threaded through the phase functions

use super::manifest::TransactionManifest;
use super::phase::Phase;
use crate::error::TransactionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Mutable context of one in-flight rename.
///
/// Owned by exactly one transaction and moved from phase to phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionState {
    pub correlation_id: String,
    pub phase: Phase,
    pub timestamp: DateTime<Utc>,
    pub vault_path: PathBuf,
    pub manifest: TransactionManifest,
    pub wal_path: Option<PathBuf>,
}

impl TransactionState {
    pub fn new(
        correlation_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        vault_path: PathBuf,
        manifest: TransactionManifest,
    ) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            phase: Phase::Plan,
            timestamp,
            vault_path,
            manifest,
            wal_path: None,
        }
    }

    /// Move to `next`, refusing transitions the state machine forbids
    pub fn transition(&mut self, next: Phase) -> Result<(), TransactionError> {
        if !self.phase.can_transition_to(next) {
            return Err(TransactionError::Failed {
                reason: format!("invalid phase transition {} -> {}", self.phase, next),
            });
        }
        self.phase = next;
        Ok(())
    }
}
