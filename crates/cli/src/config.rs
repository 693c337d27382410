// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration directory resolution and `config.toml` loading

use lv_engine::{EngineConfig, DEFAULT_GRACE_WINDOW};
use lv_storage::RetryPolicy;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Overrides the platform config directory
pub const CONFIG_DIR_ENV: &str = "LINKVAULT_CONFIG_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a config directory; pass --config-dir or set {CONFIG_DIR_ENV}")]
    NoConfigDir,

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Tunables read from `<config-dir>/config.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// WALs younger than this are left for their owner
    #[serde(with = "humantime_serde")]
    pub grace_window: Duration,
    pub write_retries: u32,
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,
}

impl Default for FileConfig {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            grace_window: DEFAULT_GRACE_WINDOW,
            write_retries: retry.retries,
            retry_delay: retry.delay,
        }
    }
}

/// Fully resolved configuration for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub config_dir: PathBuf,
    pub wal_dir: PathBuf,
    pub log_path: PathBuf,
    pub file: FileConfig,
}

impl Config {
    /// Resolve the config directory from the flag, then the environment,
    /// then the platform default, and load it
    pub fn resolve(flag: Option<PathBuf>) -> Result<Self, ConfigError> {
        let dir = config_dir(flag, std::env::var_os(CONFIG_DIR_ENV), dirs::config_dir())?;
        Self::load(dir)
    }

    pub fn load(config_dir: PathBuf) -> Result<Self, ConfigError> {
        let file = read_file_config(&config_dir.join("config.toml"))?;
        Ok(Self {
            wal_dir: config_dir.join("wal"),
            log_path: config_dir.join("logs").join("lv.log"),
            config_dir,
            file,
        })
    }

    pub fn retry(&self) -> RetryPolicy {
        RetryPolicy::new(self.file.write_retries, self.file.retry_delay)
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig::new(self.wal_dir.clone())
            .with_grace_window(self.file.grace_window)
            .with_retry(self.retry())
    }
}

fn config_dir(
    flag: Option<PathBuf>,
    env: Option<OsString>,
    platform: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    if let Some(dir) = env.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    platform
        .map(|d| d.join("linkvault"))
        .ok_or(ConfigError::NoConfigDir)
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(FileConfig::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
