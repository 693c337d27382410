// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transaction manager: the five-phase rename protocol.
//!
//! `plan → prepare → validate → commit → success`, or `abort` from any
//! live phase. The state is owned and moved through each phase; a failing
//! phase hands it back inside a [`PhaseFailure`] so abort knows exactly
//! what was done.

mod direct;
mod phases;
mod rollback;

pub use direct::DirectRenameResult;

use crate::config::EngineConfig;
use crate::error::PhaseFailure;
use crate::rewriter::TwoPhaseLinkRewriter;
use lv_adapters::{ReferenceScanner, VaultFs};
use lv_core::{
    Clock, IdGen, LinkUpdateSummary, NoteRenameSummary, Phase, PhaseTiming, RollbackResult,
    TransactionError, TransactionFailure, TransactionMetrics, TransactionResult, TransactionState,
};
use lv_storage::WriteAheadLog;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::Instrument;

/// Adapter dependencies
pub struct ManagerDeps<F, S> {
    pub fs: F,
    pub scanner: S,
}

/// A requested rename. Paths may be vault-relative or absolute inside the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRequest {
    pub from: PathBuf,
    pub to: PathBuf,
    pub update_links: bool,
}

impl RenameRequest {
    pub fn new(from: impl Into<PathBuf>, to: impl Into<PathBuf>, update_links: bool) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            update_links,
        }
    }
}

/// Drives rename transactions against one vault
pub struct TransactionManager<F, S, C: Clock, I: IdGen> {
    fs: F,
    scanner: S,
    rewriter: TwoPhaseLinkRewriter<F>,
    wal: WriteAheadLog,
    config: EngineConfig,
    clock: C,
    ids: I,
    vault: PathBuf,
}

impl<F, S, C, I> TransactionManager<F, S, C, I>
where
    F: VaultFs,
    S: ReferenceScanner,
    C: Clock,
    I: IdGen,
{
    pub fn new(
        vault: impl Into<PathBuf>,
        deps: ManagerDeps<F, S>,
        config: EngineConfig,
        clock: C,
        ids: I,
    ) -> Self {
        let vault = vault.into();
        Self {
            rewriter: TwoPhaseLinkRewriter::new(deps.fs.clone(), vault.clone()),
            fs: deps.fs,
            scanner: deps.scanner,
            wal: WriteAheadLog::open(config.wal_dir.clone(), config.retry),
            config,
            clock,
            ids,
            vault,
        }
    }

    /// Record WAL entries as owned by `pid` instead of this process
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.wal = self.wal.with_pid(pid);
        self
    }

    pub fn vault(&self) -> &Path {
        &self.vault
    }

    pub fn wal(&self) -> &WriteAheadLog {
        &self.wal
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn rewriter(&self) -> &TwoPhaseLinkRewriter<F> {
        &self.rewriter
    }

    /// Run a rename end to end. Never fails: every outcome, including a
    /// failed rollback, is reported in the returned result.
    pub async fn execute(&self, request: RenameRequest) -> TransactionResult {
        let correlation_id = self.ids.next();
        let span = tracing::info_span!(
            "rename",
            correlation_id = %correlation_id,
            from = %request.from.display(),
            to = %request.to.display(),
        );
        self.execute_inner(correlation_id, request)
            .instrument(span)
            .await
    }

    async fn execute_inner(&self, correlation_id: String, request: RenameRequest) -> TransactionResult {
        let started = Instant::now();
        let mut timings = Vec::new();

        let phase_start = Instant::now();
        let planned = self.plan(&correlation_id, &request).await;
        timings.push(timing(Phase::Plan, phase_start));

        let state = match planned {
            Ok(state) => state,
            Err(error) => {
                tracing::warn!(error = %error, "plan failed");
                return TransactionResult {
                    success: false,
                    correlation_id,
                    final_phase: Phase::Abort,
                    note_rename: None,
                    link_updates: None,
                    rollback: None,
                    error: Some(TransactionFailure::from_error(&error, None)),
                    metrics: metrics(started, timings),
                };
            }
        };

        match self.run_protocol(state, &mut timings).await {
            Ok(state) => {
                let phase_start = Instant::now();
                let state = self.success(state).await;
                timings.push(timing(Phase::Success, phase_start));
                tracing::info!(
                    files = state.manifest.link_updates.len(),
                    references = state.manifest.total_references(),
                    "rename committed"
                );
                success_result(state, metrics(started, timings))
            }
            Err(failure) => {
                let PhaseFailure { state, error } = *failure;
                tracing::warn!(phase = %state.phase, error = %error, "aborting transaction");
                let phase_start = Instant::now();
                let (state, rollback) = self.abort(state, &error).await;
                timings.push(timing(Phase::Abort, phase_start));
                failure_result(state, error, rollback, metrics(started, timings))
            }
        }
    }

    async fn run_protocol(
        &self,
        state: TransactionState,
        timings: &mut Vec<PhaseTiming>,
    ) -> crate::PhaseResult {
        let phase_start = Instant::now();
        let state = self.prepare(state).await;
        timings.push(timing(Phase::Prepare, phase_start));

        let phase_start = Instant::now();
        let state = self.validate(state?).await;
        timings.push(timing(Phase::Validate, phase_start));

        let phase_start = Instant::now();
        let state = self.commit(state?).await;
        timings.push(timing(Phase::Commit, phase_start));
        state
    }
}

fn timing(phase: Phase, start: Instant) -> PhaseTiming {
    PhaseTiming {
        phase,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

fn metrics(started: Instant, phase_timings: Vec<PhaseTiming>) -> TransactionMetrics {
    TransactionMetrics {
        total_time_ms: started.elapsed().as_millis() as u64,
        phase_timings,
    }
}

fn success_result(state: TransactionState, metrics: TransactionMetrics) -> TransactionResult {
    let manifest = &state.manifest;
    TransactionResult {
        success: true,
        correlation_id: state.correlation_id.clone(),
        final_phase: state.phase,
        note_rename: Some(NoteRenameSummary {
            from: manifest.note_rename.from.clone(),
            to: manifest.note_rename.to.clone(),
        }),
        link_updates: Some(LinkUpdateSummary {
            files_updated: manifest.link_updates.len(),
            references_updated: manifest.total_references(),
            paths: manifest.link_updates.iter().map(|u| u.path.clone()).collect(),
        }),
        rollback: None,
        error: None,
        metrics,
    }
}

fn failure_result(
    state: TransactionState,
    error: TransactionError,
    rollback: RollbackResult,
    metrics: TransactionMetrics,
) -> TransactionResult {
    let failure = if rollback.success {
        TransactionFailure::from_error(&error, None)
    } else {
        let escalated = TransactionError::RollbackFailed {
            failures: rollback.failures.clone(),
            wal_path: state.wal_path.clone(),
        };
        TransactionFailure {
            recovery_instructions: rollback.recovery_instructions.clone().unwrap_or_default(),
            ..TransactionFailure::from_error(&escalated, state.wal_path.clone())
        }
    };

    TransactionResult {
        success: false,
        correlation_id: state.correlation_id,
        final_phase: state.phase,
        note_rename: None,
        link_updates: None,
        rollback: Some(rollback),
        error: Some(failure),
        metrics,
    }
}
