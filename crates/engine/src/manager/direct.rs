// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Best-effort rename without a WAL.
//!
//! Links are rewritten file by file and the note is renamed last. A
//! failure leaves whatever already happened in place.

use super::phases::Endpoints;
use super::{RenameRequest, TransactionManager};
use crate::rewriter::DirectReport;
use lv_adapters::{ReferenceScanner, VaultFs};
use lv_core::{Clock, IdGen, LinkRename, NoteRenameSummary, TransactionError};
use serde::Serialize;
use std::fmt;

/// Outcome of a direct rename
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectRenameResult {
    pub success: bool,
    pub note_rename: NoteRenameSummary,
    pub renamed: bool,
    pub link_updates: DirectReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl fmt::Display for DirectRenameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.success { "renamed" } else { "rename incomplete" };
        writeln!(
            f,
            "{verb} (direct): {} -> {}",
            self.note_rename.from.display(),
            self.note_rename.to.display()
        )?;
        write!(
            f,
            "  links: {} reference(s) in {} file(s)",
            self.link_updates.total_references,
            self.link_updates.updated.len()
        )?;
        for failure in &self.link_updates.failures {
            write!(f, "\n  failed: {}: {}", failure.path.display(), failure.error)?;
        }
        if let Some(error) = &self.error {
            write!(f, "\n  error: {error}")?;
        }
        Ok(())
    }
}

impl<F, S, C, I> TransactionManager<F, S, C, I>
where
    F: VaultFs,
    S: ReferenceScanner,
    C: Clock,
    I: IdGen,
{
    /// Rewrite links and rename the note with no rollback. Only request
    /// validation and the reference scan can fail outright.
    pub async fn execute_direct(
        &self,
        request: &RenameRequest,
    ) -> Result<DirectRenameResult, TransactionError> {
        let Endpoints { from, to, old, new } = self.endpoints(request).await?;

        let link_updates = if request.update_links {
            let locations = self.references(&old, &from).await?;
            self.rewriter.direct(&LinkRename::new(old, new), &locations).await
        } else {
            DirectReport::default()
        };

        let from_abs = self.vault.join(&from);
        let to_abs = self.vault.join(&to);
        let renamed = async {
            if let Some(parent) = to_abs.parent() {
                self.fs.create_dir_all(parent).await?;
            }
            self.fs.rename_no_clobber(&from_abs, &to_abs).await
        }
        .await;

        let error = match renamed {
            Ok(()) => None,
            Err(e) => {
                tracing::error!(from = %from.display(), error = %e, "direct rename failed");
                Some(format!("rename failed: {e}"))
            }
        };
        let result = DirectRenameResult {
            success: error.is_none() && link_updates.failures.is_empty(),
            renamed: error.is_none(),
            note_rename: NoteRenameSummary { from, to },
            link_updates,
            error,
        };
        tracing::info!(
            success = result.success,
            files = result.link_updates.updated.len(),
            "direct rename finished"
        );
        Ok(result)
    }
}

#[cfg(test)]
#[path = "direct_tests.rs"]
mod tests;
