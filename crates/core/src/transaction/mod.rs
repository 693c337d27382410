// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rename transaction data model

mod manifest;
mod phase;
mod state;

pub use manifest::{EntryKind, LinkUpdate, NoteRename, TransactionManifest};
pub use phase::Phase;
pub use state::TransactionState;
