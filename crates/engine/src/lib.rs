// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! linkvault rename engine
//!
//! Renames a note and rewrites every wikilink aimed at it as one crash-safe
//! transaction, and recovers transactions abandoned by a crash.

mod config;
mod error;
mod manager;
mod recovery;
mod rewriter;

pub use config::{EngineConfig, DEFAULT_GRACE_WINDOW};
pub use error::{PhaseFailure, PhaseResult, RewriteError};
pub use manager::{DirectRenameResult, ManagerDeps, RenameRequest, TransactionManager};
pub use recovery::{RecoveryOutcome, RecoveryReport};
pub use rewriter::{
    DirectFailure, DirectReport, RenderOutput, RenderTimings, RenderedFile, TwoPhaseLinkRewriter,
};
