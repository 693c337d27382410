// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `lv recover`

use super::{boot_recovery, manager};
use crate::config::Config;
use crate::error::LvError;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use lv_engine::RecoveryReport;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::process::ExitCode;

pub async fn recover(config: &Config, format: OutputFormat) -> Result<ExitCode> {
    // Rollback works from the vault path recorded in each WAL
    let manager = manager(config, Path::new("."));
    let report = boot_recovery(&manager).await;
    output::print(&ReportView(report.clone()), format);

    if report.is_clean() {
        return Ok(ExitCode::SUCCESS);
    }
    if let Some(error) = &report.scan_error {
        eprint!("{}", LvError::new(format!("WAL scan failed: {error}")));
    } else {
        eprint!("{}", LvError::recovery_incomplete(report.failed, &config.wal_dir));
    }
    Ok(ExitCode::FAILURE)
}

#[derive(Serialize)]
#[serde(transparent)]
struct ReportView(RecoveryReport);

impl fmt::Display for ReportView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = &self.0;
        if report.scanned == 0 && report.scan_error.is_none() {
            return write!(f, "nothing to recover");
        }
        write!(
            f,
            "recovered {} of {} abandoned transaction(s)",
            report.recovered, report.scanned
        )?;
        for outcome in &report.outcomes {
            let id = outcome.correlation_id.as_deref().unwrap_or("-");
            let status = if outcome.already_recovered {
                "already recovered".to_string()
            } else if outcome.success {
                let restored = outcome.rollback.as_ref().map_or(0, |r| r.restored_count());
                format!("rolled back, {restored} restored")
            } else {
                format!("FAILED: {}", outcome.error.as_deref().unwrap_or("unknown error"))
            };
            write!(f, "\n  {id:<38} {status}")?;
            if let Some(rollback) = outcome.rollback.as_ref().filter(|r| !r.success) {
                for failure in &rollback.failures {
                    write!(f, "\n    {}: {}", failure.path.display(), failure.error)?;
                }
                write!(f, "\n    wal: {}", outcome.wal_path.display())?;
            }
        }
        Ok(())
    }
}
