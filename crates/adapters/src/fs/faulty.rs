// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fault-injecting filesystem for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{FsError, LocalFs, VaultFs};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    Read,
    Write,
    Rename,
    Remove,
    Exists,
    IsFile,
    CreateDir,
}

impl FsOp {
    fn as_str(self) -> &'static str {
        match self {
            FsOp::Read => "read",
            FsOp::Write => "write",
            FsOp::Rename => "rename",
            FsOp::Remove => "remove",
            FsOp::Exists => "exists",
            FsOp::IsFile => "is_file",
            FsOp::CreateDir => "create_dir",
        }
    }
}

/// Recorded filesystem call. For renames `path` is the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsCall {
    pub op: FsOp,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
struct Fault {
    op: FsOp,
    path: PathBuf,
    /// Match any path directly inside `path` instead of `path` itself
    dir: bool,
    /// Calls to let through before failing
    skip: usize,
    /// Failures left; `None` fails forever
    remaining: Option<usize>,
}

impl Fault {
    fn matches(&self, path: &Path) -> bool {
        if self.dir {
            path.parent() == Some(self.path.as_path())
        } else {
            path == self.path
        }
    }
}

#[derive(Default)]
struct FaultyState {
    faults: Vec<Fault>,
    calls: Vec<FsCall>,
}

/// Real local filesystem that fails configured operations on configured paths
#[derive(Clone, Default)]
pub struct FaultyFs {
    inner: LocalFs,
    state: Arc<Mutex<FaultyState>>,
}

impl FaultyFs {
    pub fn new(inner: LocalFs) -> Self {
        Self {
            inner,
            state: Arc::default(),
        }
    }

    /// Fail every `op` touching `path`. Renames match on either end.
    pub fn fail(&self, op: FsOp, path: impl Into<PathBuf>) -> &Self {
        self.push(op, path.into(), false, 0, None)
    }

    /// Fail the next `op` touching `path`, then behave normally
    pub fn fail_once(&self, op: FsOp, path: impl Into<PathBuf>) -> &Self {
        self.push(op, path.into(), false, 0, Some(1))
    }

    /// Let `skip` matching calls through, then fail once
    pub fn fail_nth(&self, op: FsOp, path: impl Into<PathBuf>, skip: usize) -> &Self {
        self.push(op, path.into(), false, skip, Some(1))
    }

    /// Fail every `op` on any file directly inside `dir`, including
    /// hidden temp files whose names are not known in advance
    pub fn fail_under(&self, op: FsOp, dir: impl Into<PathBuf>) -> &Self {
        self.push(op, dir.into(), true, 0, None)
    }

    /// Remove every configured fault
    pub fn heal(&self) {
        self.lock().faults.clear();
    }

    pub fn calls(&self) -> Vec<FsCall> {
        self.lock().calls.clone()
    }

    fn push(
        &self,
        op: FsOp,
        path: PathBuf,
        dir: bool,
        skip: usize,
        remaining: Option<usize>,
    ) -> &Self {
        self.lock().faults.push(Fault {
            op,
            path,
            dir,
            skip,
            remaining,
        });
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FaultyState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the call and decide whether it should fail
    fn check(&self, op: FsOp, paths: &[&Path]) -> Result<(), FsError> {
        let mut state = self.lock();
        if let Some(last) = paths.last() {
            state.calls.push(FsCall {
                op,
                path: last.to_path_buf(),
            });
        }

        for fault in state.faults.iter_mut() {
            if fault.op != op || !paths.iter().any(|p| fault.matches(p)) {
                continue;
            }
            if fault.remaining == Some(0) {
                continue;
            }
            if fault.skip > 0 {
                fault.skip -= 1;
                continue;
            }
            if let Some(n) = fault.remaining.as_mut() {
                *n -= 1;
            }
            return Err(FsError::Injected {
                op: op.as_str(),
                path: fault.path.clone(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VaultFs for FaultyFs {
    async fn read(&self, path: &Path) -> Result<String, FsError> {
        self.check(FsOp::Read, &[path])?;
        self.inner.read(path).await
    }

    async fn write_atomic(&self, path: &Path, content: &str) -> Result<(), FsError> {
        self.check(FsOp::Write, &[path])?;
        self.inner.write_atomic(path, content).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        self.check(FsOp::Rename, &[from, to])?;
        self.inner.rename(from, to).await
    }

    async fn rename_no_clobber(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        self.check(FsOp::Rename, &[from, to])?;
        self.inner.rename_no_clobber(from, to).await
    }

    async fn remove(&self, path: &Path) -> Result<bool, FsError> {
        self.check(FsOp::Remove, &[path])?;
        self.inner.remove(path).await
    }

    async fn exists(&self, path: &Path) -> Result<bool, FsError> {
        self.check(FsOp::Exists, &[path])?;
        self.inner.exists(path).await
    }

    async fn is_file(&self, path: &Path) -> Result<bool, FsError> {
        self.check(FsOp::IsFile, &[path])?;
        self.inner.is_file(path).await
    }

    async fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
        self.check(FsOp::CreateDir, &[path])?;
        self.inner.create_dir_all(path).await
    }
}

#[cfg(test)]
#[path = "faulty_tests.rs"]
mod tests;
