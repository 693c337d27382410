// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::fs::{FsError, VaultFs};
use crate::scan::{ReferenceLocation, ReferenceScanner, ScanError};
use async_trait::async_trait;
use lv_core::NoteRef;
use std::path::Path;
use tracing::Instrument;

/// Wrapper that adds tracing to any VaultFs
#[derive(Clone)]
pub struct TracedFs<F> {
    inner: F,
}

impl<F> TracedFs<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

#[async_trait]
impl<F: VaultFs> VaultFs for TracedFs<F> {
    async fn read(&self, path: &Path) -> Result<String, FsError> {
        let result = self.inner.read(path).await;
        match &result {
            Ok(content) => tracing::trace!(path = %path.display(), bytes = content.len(), "read"),
            Err(e) => tracing::debug!(path = %path.display(), error = %e, "read failed"),
        }
        result
    }

    async fn write_atomic(&self, path: &Path, content: &str) -> Result<(), FsError> {
        let span = tracing::debug_span!("fs.write", path = %path.display());
        async {
            let start = std::time::Instant::now();
            let result = self.inner.write_atomic(path, content).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::debug!(bytes = content.len(), elapsed_ms, "written"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "write failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        let span = tracing::debug_span!("fs.rename", from = %from.display(), to = %to.display());
        async {
            let result = self.inner.rename(from, to).await;
            match &result {
                Ok(()) => tracing::debug!("renamed"),
                Err(e) => tracing::warn!(error = %e, "rename failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn rename_no_clobber(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        let span = tracing::debug_span!("fs.rename", from = %from.display(), to = %to.display());
        async {
            let result = self.inner.rename_no_clobber(from, to).await;
            match &result {
                Ok(()) => tracing::debug!("renamed without replacing"),
                Err(e) => tracing::warn!(error = %e, "rename failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn remove(&self, path: &Path) -> Result<bool, FsError> {
        let result = self.inner.remove(path).await;
        match &result {
            Ok(existed) => tracing::debug!(path = %path.display(), existed, "removed"),
            // Removal is cleanup; callers decide whether it matters
            Err(e) => tracing::debug!(path = %path.display(), error = %e, "remove failed"),
        }
        result
    }

    async fn exists(&self, path: &Path) -> Result<bool, FsError> {
        let result = self.inner.exists(path).await;
        tracing::trace!(path = %path.display(), exists = ?result.as_ref().ok(), "checked");
        result
    }

    async fn is_file(&self, path: &Path) -> Result<bool, FsError> {
        self.inner.is_file(path).await
    }

    async fn create_dir_all(&self, path: &Path) -> Result<(), FsError> {
        let result = self.inner.create_dir_all(path).await;
        if let Err(e) = &result {
            tracing::warn!(path = %path.display(), error = %e, "create_dir_all failed");
        }
        result
    }
}

/// Wrapper that adds tracing to any ReferenceScanner
#[derive(Clone)]
pub struct TracedScanner<S> {
    inner: S,
}

impl<S> TracedScanner<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: ReferenceScanner> ReferenceScanner for TracedScanner<S> {
    async fn scan_references(&self, target: &NoteRef) -> Result<Vec<ReferenceLocation>, ScanError> {
        let span = tracing::info_span!("scan.references", target = %target.stem);
        async {
            tracing::debug!(name = %target.name, "scanning");
            let start = std::time::Instant::now();
            let result = self.inner.scan_references(target).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(found) => tracing::info!(
                    files = found.len(),
                    references = found.iter().map(|l| l.reference_count).sum::<usize>(),
                    elapsed_ms,
                    "scan complete"
                ),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "scan failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
