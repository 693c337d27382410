// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod recover;
pub mod rename;
pub mod wal;

use crate::config::Config;
use lv_adapters::{LocalFs, TracedFs, TracedScanner, VaultScanner};
use lv_core::{SystemClock, UuidIdGen};
use lv_engine::{ManagerDeps, RecoveryReport, TransactionManager};
use std::path::Path;

pub type Manager =
    TransactionManager<TracedFs<LocalFs>, TracedScanner<VaultScanner>, SystemClock, UuidIdGen>;

/// Production wiring: local filesystem and scanner, both traced
pub fn manager(config: &Config, vault: &Path) -> Manager {
    let deps = ManagerDeps {
        fs: TracedFs::new(LocalFs::new(config.retry())),
        scanner: TracedScanner::new(VaultScanner::new(vault)),
    };
    TransactionManager::new(vault, deps, config.engine(), SystemClock, UuidIdGen)
}

/// Roll back anything a crashed run left behind before touching the vault
pub async fn boot_recovery(manager: &Manager) -> RecoveryReport {
    let report = manager.recover_pending().await;
    if !report.is_clean() {
        tracing::warn!(
            failed = report.failed,
            "some abandoned transactions need manual recovery; see `lv wal list`"
        );
    }
    report
}
