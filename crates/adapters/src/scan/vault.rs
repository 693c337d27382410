// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scanner that walks the vault directory tree

use super::{ReferenceLocation, ReferenceScanner, ScanError};
use async_trait::async_trait;
use lv_core::{NoteRef, NOTE_EXTENSION};
use std::path::{Path, PathBuf};

/// Walks every `.md` file under the vault root. Dot-prefixed files and
/// directories (`.obsidian`, `.git`, staged temp files) are skipped.
#[derive(Clone, Debug)]
pub struct VaultScanner {
    root: PathBuf,
}

impl VaultScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Vault-relative paths of every note, sorted
    pub async fn notes(&self) -> Result<Vec<PathBuf>, ScanError> {
        let mut notes = Vec::new();
        let mut stack = vec![PathBuf::new()];

        while let Some(rel_dir) = stack.pop() {
            let dir = self.root.join(&rel_dir);
            let walk_err = |source| ScanError::Walk {
                path: dir.clone(),
                source,
            };
            let mut entries = tokio::fs::read_dir(&dir).await.map_err(walk_err)?;
            while let Some(entry) = entries.next_entry().await.map_err(walk_err)? {
                let name = entry.file_name();
                let Some(name_str) = name.to_str() else {
                    continue;
                };
                if name_str.starts_with('.') {
                    continue;
                }
                let file_type = entry.file_type().await.map_err(walk_err)?;
                let rel = rel_dir.join(&name);
                if file_type.is_dir() {
                    stack.push(rel);
                } else if file_type.is_file() && is_note(&rel) {
                    notes.push(rel);
                }
            }
        }

        notes.sort();
        Ok(notes)
    }
}

fn is_note(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(NOTE_EXTENSION))
}

#[async_trait]
impl ReferenceScanner for VaultScanner {
    async fn scan_references(&self, target: &NoteRef) -> Result<Vec<ReferenceLocation>, ScanError> {
        let mut found = Vec::new();
        for rel in self.notes().await? {
            let path = self.root.join(&rel);
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                // Deleted between listing and reading
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    tracing::debug!(path = %rel.display(), "skipping non-UTF-8 note");
                    continue;
                }
                Err(source) => return Err(ScanError::Read { path, source }),
            };
            let reference_count = target.count_links(&content);
            if reference_count > 0 {
                found.push(ReferenceLocation {
                    path: rel,
                    reference_count,
                });
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
#[path = "vault_tests.rs"]
mod tests;
