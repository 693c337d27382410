// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration

use lv_storage::RetryPolicy;
use std::path::PathBuf;
use std::time::Duration;

/// WAL files younger than this are assumed to belong to a live transaction
pub const DEFAULT_GRACE_WINDOW: Duration = Duration::from_secs(60);

/// Paths and timings the engine needs, passed in explicitly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// WAL directory, outside the vault
    pub wal_dir: PathBuf,
    pub grace_window: Duration,
    pub retry: RetryPolicy,
}

impl EngineConfig {
    pub fn new(wal_dir: impl Into<PathBuf>) -> Self {
        Self {
            wal_dir: wal_dir.into(),
            grace_window: DEFAULT_GRACE_WINDOW,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_grace_window(mut self, grace_window: Duration) -> Self {
        self.grace_window = grace_window;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
