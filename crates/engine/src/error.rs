// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the rename engine

use lv_adapters::FsError;
use lv_core::{PathError, TransactionError, TransactionState};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from rendering or committing link rewrites
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("invalid path: {0}")]
    Path(#[from] PathError),
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: FsError,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: FsError,
    },
    #[error("{} changed since it was rendered", .0.display())]
    Stale(PathBuf),
    #[error("no rendered content for {}", .0.display())]
    MissingContent(PathBuf),
}

impl RewriteError {
    /// Vault-relative path the error concerns, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            RewriteError::Path(_) => None,
            RewriteError::Read { path, .. }
            | RewriteError::Write { path, .. }
            | RewriteError::Stale(path)
            | RewriteError::MissingContent(path) => Some(path),
        }
    }
}

/// A phase failed. Carries the state as it stood so abort can undo it.
#[derive(Debug)]
pub struct PhaseFailure {
    pub state: TransactionState,
    pub error: TransactionError,
}

impl PhaseFailure {
    pub fn new(state: TransactionState, error: TransactionError) -> Box<Self> {
        Box::new(Self { state, error })
    }
}

/// Outcome of every phase after plan
pub type PhaseResult = Result<TransactionState, Box<PhaseFailure>>;
