// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `lv rename`

use super::{boot_recovery, manager};
use crate::config::Config;
use crate::error::LvError;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use lv_core::{IdGen, TransactionFailure, TransactionState, UuidIdGen};
use lv_engine::RenameRequest;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Args)]
pub struct RenameArgs {
    /// Vault root directory
    #[arg(long)]
    pub vault: PathBuf,
    /// Note to rename, relative to the vault
    pub old: PathBuf,
    /// New path for the note, relative to the vault
    pub new: PathBuf,
    /// Rename the note only; leave links untouched
    #[arg(long)]
    pub no_links: bool,
    /// Plan the rename and print what would change
    #[arg(long, conflicts_with = "direct")]
    pub dry_run: bool,
    /// Rewrite links file by file with no WAL or rollback
    #[arg(long)]
    pub direct: bool,
}

pub async fn rename(args: RenameArgs, config: &Config, format: OutputFormat) -> Result<ExitCode> {
    let vault = std::fs::canonicalize(&args.vault)
        .ok()
        .filter(|v| v.is_dir())
        .ok_or_else(|| LvError::vault_not_found(&args.vault))?;
    let manager = manager(config, &vault);
    boot_recovery(&manager).await;

    let request = RenameRequest::new(args.old, args.new, !args.no_links);

    if args.dry_run {
        return match manager.plan(&UuidIdGen.next(), &request).await {
            Ok(state) => {
                output::print(&PlanSummary::from(&state), format);
                Ok(ExitCode::SUCCESS)
            }
            Err(error) => {
                output::print(&PlanRejected(TransactionFailure::from_error(&error, None)), format);
                Ok(ExitCode::FAILURE)
            }
        };
    }

    if args.direct {
        let result = match manager.execute_direct(&request).await {
            Ok(result) => result,
            Err(error) => {
                output::print(&PlanRejected(TransactionFailure::from_error(&error, None)), format);
                return Ok(ExitCode::FAILURE);
            }
        };
        output::print(&result, format);
        return Ok(exit_code(result.success));
    }

    let result = manager.execute(request).await;
    output::print(&result, format);
    Ok(exit_code(result.success))
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// What a rename would do, from the plan phase alone
#[derive(Debug, Serialize)]
struct PlanSummary {
    from: PathBuf,
    to: PathBuf,
    total_references: usize,
    files: Vec<PlannedFile>,
}

#[derive(Debug, Serialize)]
struct PlannedFile {
    path: PathBuf,
    references: usize,
}

impl From<&TransactionState> for PlanSummary {
    fn from(state: &TransactionState) -> Self {
        let manifest = &state.manifest;
        Self {
            from: manifest.note_rename.from.clone(),
            to: manifest.note_rename.to.clone(),
            total_references: manifest.total_references(),
            files: manifest
                .link_updates
                .iter()
                .map(|u| PlannedFile {
                    path: u.path.clone(),
                    references: u.reference_count,
                })
                .collect(),
        }
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "would rename: {} -> {}", self.from.display(), self.to.display())?;
        write!(
            f,
            "  links: {} reference(s) in {} file(s)",
            self.total_references,
            self.files.len()
        )?;
        for file in &self.files {
            write!(f, "\n    {} ({})", file.path.display(), file.references)?;
        }
        Ok(())
    }
}

/// A request refused before anything was written
#[derive(Debug, Serialize)]
#[serde(transparent)]
struct PlanRejected(TransactionFailure);

impl fmt::Display for PlanRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rename refused: {} {}", self.0.code, self.0.message)
    }
}
