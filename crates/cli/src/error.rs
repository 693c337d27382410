// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing errors: what went wrong, why, and how to fix it

use std::fmt;
use std::path::Path;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct LvError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl LvError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for LvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for LvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl LvError {
    pub fn vault_not_found(vault: &Path) -> Self {
        LvError::new(format!("vault '{}' is not a directory", vault.display()))
            .with_suggestion("Pass the vault root with --vault DIR")
    }

    pub fn wal_unreadable<E>(wal: &Path, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        LvError::new(format!("cannot read WAL '{}'", wal.display()))
            .with_context(source.to_string())
            .with_context("The file may have been truncated by a crash or edited by hand")
            .with_suggestion("Check the notes it names by hand and restore them if needed")
            .with_suggestion("Delete the file once the vault is consistent")
            .with_source(source)
    }

    pub fn recovery_incomplete(failed: usize, wal_dir: &Path) -> Self {
        LvError::new(format!("{} abandoned transaction(s) could not be recovered", failed))
            .with_context("Files changed after the crash are never overwritten")
            .with_suggestion("List what is left: lv wal list")
            .with_suggestion(format!(
                "Inspect each WAL under {} with: lv wal show <PATH>",
                wal_dir.display()
            ))
    }
}
