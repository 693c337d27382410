// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL entry structure with checksum verification

use chrono::{DateTime, Utc};
use lv_core::{Phase, TransactionManifest, TransactionState};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Current on-disk schema version
pub const WAL_VERSION: u32 = 1;

/// Operation tag for rename transactions
pub const RENAME_OPERATION: &str = "rename";

/// A transaction's durable intent at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalEntry {
    pub version: u32,
    pub correlation_id: String,
    pub timestamp: DateTime<Utc>,
    pub vault_path: PathBuf,
    pub phase: Phase,
    pub operation: String,
    pub manifest: TransactionManifest,
    /// Process that owns the transaction
    pub pid: u32,
    /// CRC32 of the serialized manifest
    pub checksum: u32,
}

impl WalEntry {
    pub fn from_state(state: &TransactionState, pid: u32) -> Self {
        Self {
            version: WAL_VERSION,
            correlation_id: state.correlation_id.clone(),
            timestamp: state.timestamp,
            vault_path: state.vault_path.clone(),
            phase: state.phase,
            operation: RENAME_OPERATION.to_string(),
            manifest: state.manifest.clone(),
            pid,
            checksum: Self::calculate_checksum(&state.manifest),
        }
    }

    /// CRC32 of the manifest's compact JSON form
    pub fn calculate_checksum(manifest: &TransactionManifest) -> u32 {
        // Manifest fields are strings, paths, booleans and integers, all of
        // which serialize infallibly
        let json = serde_json::to_string(manifest).unwrap_or_default();
        crc32fast::hash(json.as_bytes())
    }

    pub fn verify(&self) -> bool {
        self.checksum == Self::calculate_checksum(&self.manifest)
    }

    /// Rebuild the run state this entry was persisted from
    pub fn into_state(self, wal_path: PathBuf) -> TransactionState {
        TransactionState {
            correlation_id: self.correlation_id,
            phase: self.phase,
            timestamp: self.timestamp,
            vault_path: self.vault_path,
            manifest: self.manifest,
            wal_path: Some(wal_path),
        }
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
