// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transaction manifest: the unit of durable intent
//!
//! Built once during planning. Content is immutable afterwards; only the
//! `completed` flags (set during commit) and staging paths (set during
//! prepare) change.

use crate::hash::ContentHash;
use crate::path::{vault_relative, PathError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Which kind of manifest entry an action applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    NoteRename,
    LinkUpdate,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::NoteRename => f.write_str("note_rename"),
            EntryKind::LinkUpdate => f.write_str("link_update"),
        }
    }
}

/// The note being moved. Paths are vault-relative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRename {
    pub from: PathBuf,
    pub to: PathBuf,
    pub sha256_before: ContentHash,
    #[serde(default)]
    pub completed: bool,
}

/// A file whose wikilinks point at the renamed note. Paths are vault-relative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkUpdate {
    pub path: PathBuf,
    pub sha256_before: ContentHash,
    /// Digest of `rendered_content`, i.e. the file once promoted
    pub sha256_after: ContentHash,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staged_path: Option<PathBuf>,
    pub reference_count: usize,
    #[serde(default)]
    pub completed: bool,
}

impl LinkUpdate {
    pub fn new(path: PathBuf, sha256_before: ContentHash, rendered: String, reference_count: usize) -> Self {
        Self {
            path,
            sha256_before,
            sha256_after: ContentHash::of(&rendered),
            rendered_content: Some(rendered),
            staged_path: None,
            reference_count,
            completed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionManifest {
    pub note_rename: NoteRename,
    #[serde(default)]
    pub link_updates: Vec<LinkUpdate>,
    pub total_operations: usize,
}

impl TransactionManifest {
    pub fn new(note_rename: NoteRename, link_updates: Vec<LinkUpdate>) -> Self {
        let total_operations = 1 + link_updates.len();
        Self {
            note_rename,
            link_updates,
            total_operations,
        }
    }

    /// Number of entries already promoted
    pub fn completed_operations(&self) -> usize {
        usize::from(self.note_rename.completed)
            + self.link_updates.iter().filter(|u| u.completed).count()
    }

    /// Total wikilinks the transaction rewrites
    pub fn total_references(&self) -> usize {
        self.link_updates.iter().map(|u| u.reference_count).sum()
    }

    pub fn link_update(&self, path: &Path) -> Option<&LinkUpdate> {
        self.link_updates.iter().find(|u| u.path == path)
    }

    /// Check every path stays inside the vault.
    ///
    /// Manifests read back from disk are untrusted input.
    pub fn validate_paths(&self) -> Result<(), PathError> {
        vault_relative(&self.note_rename.from)?;
        vault_relative(&self.note_rename.to)?;
        for update in &self.link_updates {
            vault_relative(&update.path)?;
            if let Some(staged) = &update.staged_path {
                vault_relative(staged)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
