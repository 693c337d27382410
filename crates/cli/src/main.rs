// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! lv - transactional note renames for markdown vaults

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod config;
mod error;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{recover, rename, wal};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::Config;
use crate::error::LvError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "lv",
    version,
    about = "linkvault - rename notes and rewrite their wikilinks atomically"
)]
struct Cli {
    /// Directory holding config.toml, the WAL and logs
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rename a note and update every wikilink to it
    Rename(rename::RenameArgs),
    /// Roll back transactions abandoned by a crash
    Recover,
    /// Inspect the write-ahead log
    Wal(wal::WalArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<LvError>() {
                Some(lv) => eprint!("{}", lv),
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::resolve(cli.config_dir)?;
    let _log_guard = logging::setup_logging(&config.log_path)?;
    tracing::debug!(config_dir = %config.config_dir.display(), "starting lv");

    match cli.command {
        Commands::Rename(args) => rename::rename(args, &config, cli.format).await,
        Commands::Recover => recover::recover(&config, cli.format).await,
        Commands::Wal(args) => {
            wal::wal(args, &config, cli.format).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
