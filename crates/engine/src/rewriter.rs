// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Two-phase link rewriting.
//!
//! `render` computes every affected file's new content in memory without
//! writing. `commit` writes a rendered map after re-checking each file
//! against its planned digest. The transaction manager uses `stage` and
//! `promote` instead of `commit` so nothing is live until validation passed.

use crate::error::RewriteError;
use lv_adapters::{ReferenceLocation, VaultFs};
use lv_core::{resolve, vault_relative, ContentHash, LinkRename, LinkUpdate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// New content for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub content: String,
    /// Digest of the content the rendering was based on
    pub sha256_before: ContentHash,
    pub reference_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderTimings {
    pub read_ms: u64,
    pub render_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutput {
    /// Files whose content changes, keyed by vault-relative path
    pub content_map: BTreeMap<PathBuf, RenderedFile>,
    pub total_references: usize,
    pub timings: RenderTimings,
}

impl RenderOutput {
    /// Manifest entries for every rendered file, in path order
    pub fn into_link_updates(self) -> Vec<LinkUpdate> {
        self.content_map
            .into_iter()
            .map(|(path, file)| {
                LinkUpdate::new(path, file.sha256_before, file.content, file.reference_count)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of a best-effort, non-transactional rewrite
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectReport {
    pub updated: Vec<PathBuf>,
    pub total_references: usize,
    pub failures: Vec<DirectFailure>,
}

#[derive(Clone)]
pub struct TwoPhaseLinkRewriter<F> {
    fs: F,
    vault: PathBuf,
}

impl<F: VaultFs> TwoPhaseLinkRewriter<F> {
    pub fn new(fs: F, vault: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            vault: vault.into(),
        }
    }

    pub fn vault(&self) -> &Path {
        &self.vault
    }

    /// Render new content for every discovered file. Writes nothing.
    pub async fn render(
        &self,
        rename: &LinkRename,
        files: &[ReferenceLocation],
    ) -> Result<RenderOutput, RewriteError> {
        let mut output = RenderOutput::default();
        for location in files {
            let (rel, rendered) = self.render_one(rename, &location.path, &mut output.timings).await?;
            if let Some(rendered) = rendered {
                output.total_references += rendered.reference_count;
                output.content_map.insert(rel, rendered);
            }
        }
        tracing::debug!(
            files = output.content_map.len(),
            references = output.total_references,
            read_ms = output.timings.read_ms,
            render_ms = output.timings.render_ms,
            "rendered link rewrites"
        );
        Ok(output)
    }

    async fn render_one(
        &self,
        rename: &LinkRename,
        path: &Path,
        timings: &mut RenderTimings,
    ) -> Result<(PathBuf, Option<RenderedFile>), RewriteError> {
        let rel = vault_relative(path)?;
        let abs = self.vault.join(&rel);

        let start = Instant::now();
        let original = self
            .fs
            .read(&abs)
            .await
            .map_err(|source| RewriteError::Read {
                path: rel.clone(),
                source,
            })?;
        timings.read_ms += start.elapsed().as_millis() as u64;

        let start = Instant::now();
        let rewrite = rename.rewrite(&original);
        timings.render_ms += start.elapsed().as_millis() as u64;

        if !rewrite.changed() || rewrite.content == original {
            return Ok((rel, None));
        }
        let rendered = RenderedFile {
            sha256_before: ContentHash::of(&original),
            reference_count: rewrite.replaced,
            content: rewrite.content,
        };
        Ok((rel, Some(rendered)))
    }

    /// Write rendered content in place, sequentially. Each file is
    /// re-read first and must still match its entry's `sha256_before`.
    /// Returns the paths written.
    pub async fn commit(
        &self,
        content_map: &BTreeMap<PathBuf, RenderedFile>,
        entries: &[LinkUpdate],
    ) -> Result<Vec<PathBuf>, RewriteError> {
        let mut written = Vec::with_capacity(entries.len());
        for entry in entries {
            let content = content_map
                .get(&entry.path)
                .map(|f| f.content.as_str())
                .or(entry.rendered_content.as_deref())
                .ok_or_else(|| RewriteError::MissingContent(entry.path.clone()))?;
            self.commit_one(&entry.path, &entry.sha256_before, content).await?;
            written.push(entry.path.clone());
        }
        Ok(written)
    }

    async fn commit_one(
        &self,
        rel: &Path,
        expected: &ContentHash,
        content: &str,
    ) -> Result<(), RewriteError> {
        self.check_fresh(rel, expected).await?;
        let abs = resolve(&self.vault, rel)?;
        self.fs
            .write_atomic(&abs, content)
            .await
            .map_err(|source| RewriteError::Write {
                path: rel.to_path_buf(),
                source,
            })?;
        tracing::debug!(path = %rel.display(), "rewrote links");
        Ok(())
    }

    /// Fail with `Stale` unless the live file still hashes to `expected`
    pub async fn check_fresh(&self, rel: &Path, expected: &ContentHash) -> Result<(), RewriteError> {
        let abs = resolve(&self.vault, rel)?;
        match self.fs.read(&abs).await {
            Ok(live) if expected.matches(&live) => Ok(()),
            Ok(_) => Err(RewriteError::Stale(rel.to_path_buf())),
            Err(e) if e.is_not_found() => Err(RewriteError::Stale(rel.to_path_buf())),
            Err(source) => Err(RewriteError::Read {
                path: rel.to_path_buf(),
                source,
            }),
        }
    }

    /// Write `content` to a hidden sibling of `rel` without touching `rel`
    pub async fn stage(&self, staged: &Path, content: &str) -> Result<(), RewriteError> {
        let abs = resolve(&self.vault, staged)?;
        self.fs
            .write_atomic(&abs, content)
            .await
            .map_err(|source| RewriteError::Write {
                path: staged.to_path_buf(),
                source,
            })
    }

    /// Atomically replace `rel` with its staged file
    pub async fn promote(&self, staged: &Path, rel: &Path) -> Result<(), RewriteError> {
        let from = resolve(&self.vault, staged)?;
        let to = resolve(&self.vault, rel)?;
        self.fs
            .rename(&from, &to)
            .await
            .map_err(|source| RewriteError::Write {
                path: rel.to_path_buf(),
                source,
            })
    }

    /// Render and write in one pass with no staging or rollback.
    /// Failures are collected per file and do not stop the run.
    pub async fn direct(&self, rename: &LinkRename, files: &[ReferenceLocation]) -> DirectReport {
        let mut report = DirectReport::default();
        let mut timings = RenderTimings::default();

        for location in files {
            let outcome = match self.render_one(rename, &location.path, &mut timings).await {
                Ok((rel, Some(rendered))) => self
                    .commit_one(&rel, &rendered.sha256_before, &rendered.content)
                    .await
                    .map(|()| Some((rel, rendered.reference_count))),
                Ok((_, None)) => Ok(None),
                Err(e) => Err(e),
            };
            match outcome {
                Ok(Some((rel, count))) => {
                    report.total_references += count;
                    report.updated.push(rel);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(path = %location.path.display(), error = %e, "direct rewrite failed");
                    report.failures.push(DirectFailure {
                        path: location.path.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }
}

#[cfg(test)]
#[path = "rewriter_tests.rs"]
mod tests;
