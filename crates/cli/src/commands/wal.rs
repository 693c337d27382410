// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `lv wal`: read-only inspection of the write-ahead log directory

use crate::config::Config;
use crate::error::LvError;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use lv_core::Phase;
use lv_storage::{WalEntry, WriteAheadLog};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Args)]
pub struct WalArgs {
    #[command(subcommand)]
    pub command: WalCommand,
}

#[derive(Subcommand)]
pub enum WalCommand {
    /// List WAL files with age, phase and owning process
    List,
    /// Print one WAL entry
    Show {
        /// WAL file, absolute or relative to the WAL directory
        path: PathBuf,
    },
}

pub async fn wal(args: WalArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let wal = WriteAheadLog::open(&config.wal_dir, config.retry());
    match args.command {
        WalCommand::List => {
            let now = Utc::now();
            let mut rows = Vec::new();
            for path in wal.list().await? {
                let row = match wal.read(&path).await {
                    Ok(entry) => WalRow::from_entry(path, &entry, now),
                    Err(e) => WalRow::unreadable(path, e.to_string()),
                };
                rows.push(row);
            }
            output::print_list(&rows, format, "No pending transactions");
        }
        WalCommand::Show { path } => {
            let path = resolve_wal_path(wal.dir(), path);
            let entry = wal
                .read(&path)
                .await
                .map_err(|e| LvError::wal_unreadable(&path, e))?;
            output::print(&EntryView(entry), format);
        }
    }
    Ok(())
}

fn resolve_wal_path(dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() || path.exists() {
        path
    } else {
        dir.join(path)
    }
}

#[derive(Debug, Serialize)]
struct WalRow {
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phase: Option<Phase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    age_secs: Option<u64>,
    completed: usize,
    total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl WalRow {
    fn from_entry(path: PathBuf, entry: &WalEntry, now: DateTime<Utc>) -> Self {
        Self {
            path,
            correlation_id: Some(entry.correlation_id.clone()),
            phase: Some(entry.phase),
            pid: Some(entry.pid),
            age_secs: Some((now - entry.timestamp).num_seconds().max(0) as u64),
            completed: entry.manifest.completed_operations(),
            total: entry.manifest.total_operations,
            error: None,
        }
    }

    fn unreadable(path: PathBuf, error: String) -> Self {
        Self {
            path,
            correlation_id: None,
            phase: None,
            pid: None,
            age_secs: None,
            completed: 0,
            total: 0,
            error: Some(error),
        }
    }
}

impl fmt::Display for WalRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned());
        if let Some(error) = &self.error {
            return write!(f, "{:<38} UNREADABLE {}  ({})", "-", name, error);
        }
        let age = self
            .age_secs
            .map(|s| humantime::format_duration(Duration::from_secs(s)).to_string())
            .unwrap_or_default();
        write!(
            f,
            "{:<38} {:<9} pid={:<8} {}/{} {} ago  {}",
            self.correlation_id.as_deref().unwrap_or("-"),
            self.phase.map_or("-", Phase::as_str),
            self.pid.map(|p| p.to_string()).unwrap_or_default(),
            self.completed,
            self.total,
            age,
            name
        )
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct EntryView(WalEntry);

impl fmt::Display for EntryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = &self.0;
        let done = |completed: bool| if completed { "done" } else { "pending" };
        let note = &entry.manifest.note_rename;
        writeln!(f, "transaction {} ({})", entry.correlation_id, entry.operation)?;
        writeln!(f, "  phase: {}", entry.phase)?;
        writeln!(f, "  vault: {}", entry.vault_path.display())?;
        writeln!(f, "  started: {} by pid {}", entry.timestamp.to_rfc3339(), entry.pid)?;
        write!(
            f,
            "  note: {} -> {} [{}]",
            note.from.display(),
            note.to.display(),
            done(note.completed)
        )?;
        for update in &entry.manifest.link_updates {
            write!(
                f,
                "\n  links: {} ({} reference(s)) [{}]",
                update.path.display(),
                update.reference_count,
                done(update.completed)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
