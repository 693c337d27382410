// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for CLI specs

#![allow(dead_code)]

use assert_cmd::assert::Assert;
use assert_cmd::Command;
use lv_core::{ContentHash, NoteRename, Phase, TransactionManifest, TransactionState};
use lv_storage::{RetryPolicy, WriteAheadLog};
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// PID recorded in WALs that stand in for a crashed run. Above every
/// kernel's pid limit, so it is never running.
pub const CRASHED_PID: u32 = 5_000_000;

/// A temporary vault plus its own config directory
pub struct Vault {
    vault: TempDir,
    config: TempDir,
}

impl Vault {
    pub fn empty() -> Self {
        Self {
            vault: TempDir::new().unwrap(),
            config: TempDir::new().unwrap(),
        }
    }

    pub fn with(files: &[(&str, &str)]) -> Self {
        let vault = Self::empty();
        for (rel, content) in files {
            vault.file(rel, content);
        }
        vault
    }

    pub fn file(&self, rel: &str, content: &str) -> &Self {
        let path = self.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
        self
    }

    pub fn path(&self) -> &Path {
        self.vault.path()
    }

    pub fn config_dir(&self) -> &Path {
        self.config.path()
    }

    pub fn wal_dir(&self) -> PathBuf {
        self.config_dir().join("wal")
    }

    pub fn config_toml(&self, content: &str) {
        std::fs::write(self.config_dir().join("config.toml"), content).unwrap();
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path().join(rel)).unwrap()
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path().join(rel).exists()
    }

    pub fn wal_files(&self) -> Vec<PathBuf> {
        let Ok(entries) = std::fs::read_dir(self.wal_dir()) else {
            return Vec::new();
        };
        let mut files: Vec<_> = entries
            .map(|e| e.unwrap().path())
            .filter(|p| p.to_string_lossy().ends_with(".wal.json"))
            .collect();
        files.sort();
        files
    }

    /// `lv` pointed at this vault's config directory
    pub fn lv(&self) -> Cli {
        let mut cmd = Command::cargo_bin("lv").unwrap();
        cmd.env_remove("LINKVAULT_CONFIG_DIR")
            .env("RUST_LOG", "info")
            .arg("--config-dir")
            .arg(self.config_dir());
        Cli { cmd }
    }

    /// `lv rename --vault <vault> <old> <new>`
    pub fn rename(&self, old: &str, new: &str) -> Cli {
        let mut cli = self.lv();
        cli.cmd.arg("rename").arg("--vault").arg(self.path()).arg(old).arg(new);
        cli
    }

    /// Leave behind the WAL of a rename that crashed five minutes ago.
    /// With `renamed` the note was already moved on disk.
    pub fn abandoned_rename(&self, from: &str, to: &str, renamed: bool) -> PathBuf {
        let content = self.read(from);
        let manifest = TransactionManifest::new(
            NoteRename {
                from: from.into(),
                to: to.into(),
                sha256_before: ContentHash::of(&content),
                completed: renamed,
            },
            Vec::new(),
        );
        let mut state = TransactionState::new(
            format!("crashed-{}", from.trim_end_matches(".md")),
            chrono::Utc::now() - chrono::Duration::minutes(5),
            self.path().to_path_buf(),
            manifest,
        );
        state.phase = Phase::Commit;
        if renamed {
            std::fs::rename(self.path().join(from), self.path().join(to)).unwrap();
        }

        let wal = WriteAheadLog::open(self.wal_dir(), RetryPolicy::none()).with_pid(CRASHED_PID);
        tokio::runtime::Runtime::new()
            .unwrap()
            .block_on(wal.persist(&state))
            .unwrap()
    }
}

/// Command builder with fluent pass/fail assertions
pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn passes(mut self) -> Run {
        Run(self.cmd.assert().success())
    }

    pub fn fails(mut self) -> Run {
        Run(self.cmd.assert().failure())
    }
}

pub struct Run(Assert);

impl Run {
    pub fn stdout_has(self, expected: &str) -> Self {
        Run(self.0.stdout(predicate::str::contains(expected)))
    }

    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        Run(self.0.stdout(predicate::str::contains(unexpected).not()))
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        Run(self.0.stderr(predicate::str::contains(expected)))
    }

    pub fn stdout_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.0.get_output().stdout).unwrap()
    }
}
