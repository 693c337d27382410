// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared vault fixtures for engine integration tests.

#![allow(dead_code)]

use lv_adapters::{FaultyFs, VaultScanner};
use lv_core::{FakeClock, SequentialIdGen};
use lv_engine::{EngineConfig, ManagerDeps, TransactionManager};
use lv_storage::RetryPolicy;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub type Manager = TransactionManager<FaultyFs, VaultScanner, FakeClock, SequentialIdGen>;

/// PID recorded by managers standing in for a process that crashed.
/// Above every kernel's pid limit, so it is never running.
pub const CRASHED_PID: u32 = 5_000_000;

/// A temporary vault plus a WAL directory outside it
pub struct Harness {
    pub vault: TempDir,
    pub config_dir: TempDir,
    pub fs: FaultyFs,
    pub clock: FakeClock,
    pub ids: SequentialIdGen,
}

impl Harness {
    pub fn new(files: &[(&str, &str)]) -> Self {
        let harness = Self {
            vault: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
            fs: FaultyFs::default(),
            clock: FakeClock::new(),
            ids: SequentialIdGen::new("tx"),
        };
        for (rel, content) in files {
            harness.write(rel, content);
        }
        harness
    }

    pub fn config(&self) -> EngineConfig {
        EngineConfig::new(self.wal_dir()).with_retry(RetryPolicy::none())
    }

    pub fn wal_dir(&self) -> PathBuf {
        self.config_dir.path().join("wal")
    }

    pub fn manager(&self) -> Manager {
        TransactionManager::new(
            self.vault.path(),
            ManagerDeps {
                fs: self.fs.clone(),
                scanner: VaultScanner::new(self.vault.path()),
            },
            self.config(),
            self.clock.clone(),
            self.ids.clone(),
        )
    }

    /// A manager whose WAL entries look like they belong to another process
    pub fn crashed_manager(&self) -> Manager {
        self.manager().with_pid(CRASHED_PID)
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.vault.path().join(rel)
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.path(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).unwrap()
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path(rel).exists()
    }

    pub fn wal_files(&self) -> Vec<PathBuf> {
        list_files(&self.wal_dir())
            .into_iter()
            .filter(|p| p.to_string_lossy().ends_with(".wal.json"))
            .filter(|p| p.parent() == Some(self.wal_dir().as_path()))
            .collect()
    }

    pub fn backup_files(&self) -> Vec<PathBuf> {
        list_files(&self.wal_dir().join("backups"))
    }

    /// Every file in the vault, hidden ones included, with its content
    pub fn snapshot(&self) -> BTreeMap<PathBuf, String> {
        list_files(self.vault.path())
            .into_iter()
            .map(|p| {
                let content = std::fs::read_to_string(&p).unwrap();
                (p.strip_prefix(self.vault.path()).unwrap().to_path_buf(), content)
            })
            .collect()
    }
}

fn list_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}
