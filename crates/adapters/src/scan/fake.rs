// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake reference scanner for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ReferenceLocation, ReferenceScanner, ScanError};
use async_trait::async_trait;
use lv_core::NoteRef;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeScannerState {
    results: Vec<ReferenceLocation>,
    error: Option<String>,
    calls: Vec<NoteRef>,
}

/// Scanner returning canned locations regardless of the target
#[derive(Clone, Default)]
pub struct FakeScanner {
    state: Arc<Mutex<FakeScannerState>>,
}

impl FakeScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `path` with `count` references on every scan
    pub fn add(&self, path: impl Into<PathBuf>, count: usize) -> &Self {
        self.lock().results.push(ReferenceLocation {
            path: path.into(),
            reference_count: count,
        });
        self
    }

    /// Make every scan fail with `message`
    pub fn fail_with(&self, message: impl Into<String>) {
        self.lock().error = Some(message.into());
    }

    pub fn calls(&self) -> Vec<NoteRef> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeScannerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ReferenceScanner for FakeScanner {
    async fn scan_references(&self, target: &NoteRef) -> Result<Vec<ReferenceLocation>, ScanError> {
        let mut state = self.lock();
        state.calls.push(target.clone());
        if let Some(message) = &state.error {
            return Err(ScanError::Failed(message.clone()));
        }
        Ok(state.results.clone())
    }
}
