// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lv-core: data model for transactional note renames
//!
//! This crate provides:
//! - The transaction manifest, state and phase state machine
//! - The error taxonomy and result types returned to callers
//! - Content digests and the wikilink rewrite rule
//! - Clock and ID abstractions for deterministic tests

pub mod clock;
pub mod error;
pub mod hash;
pub mod id;
pub mod link;
pub mod path;
pub mod result;
pub mod transaction;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{RecoveryAction, TransactionError, TransactionErrorCode};
pub use hash::ContentHash;
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use link::{LinkRename, NoteRef, Rewrite, NOTE_EXTENSION};
pub use path::{resolve, vault_relative, PathError};
pub use result::{
    LinkUpdateSummary, NoteRenameSummary, PhaseTiming, RollbackFailure, RollbackResult,
    RolledBackEntry, TransactionFailure, TransactionMetrics, TransactionResult,
};
pub use transaction::{
    EntryKind, LinkUpdate, NoteRename, Phase, TransactionManifest, TransactionState,
};
