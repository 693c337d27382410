// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reference discovery: which vault files link to a note

mod vault;

pub use vault::VaultScanner;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeScanner;

use async_trait::async_trait;
use lv_core::NoteRef;
use std::path::PathBuf;
use thiserror::Error;

/// A file containing links to the scanned note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceLocation {
    /// Vault-relative path
    pub path: PathBuf,
    pub reference_count: usize,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to list {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("scan failed: {0}")]
    Failed(String),
}

/// Read-only discovery of files linking to a note
#[async_trait]
pub trait ReferenceScanner: Clone + Send + Sync + 'static {
    /// Files containing at least one wikilink aimed at `target`, sorted by path
    async fn scan_references(&self, target: &NoteRef) -> Result<Vec<ReferenceLocation>, ScanError>;
}
