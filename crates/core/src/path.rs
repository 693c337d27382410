// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Vault-relative path hygiene

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path is empty")]
    Empty,
    #[error("path must be relative to the vault: {0}")]
    Absolute(PathBuf),
    #[error("path escapes the vault: {0}")]
    Escapes(PathBuf),
}

/// Normalize a vault-relative path, rejecting anything that could leave the vault.
///
/// `.` components are dropped; absolute paths and `..` components are errors.
pub fn vault_relative(path: &Path) -> Result<PathBuf, PathError> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => return Err(PathError::Escapes(path.to_path_buf())),
            Component::RootDir | Component::Prefix(_) => {
                return Err(PathError::Absolute(path.to_path_buf()))
            }
        }
    }
    if normalized.as_os_str().is_empty() {
        return Err(PathError::Empty);
    }
    Ok(normalized)
}

/// Resolve a vault-relative path against the vault root
pub fn resolve(vault: &Path, rel: &Path) -> Result<PathBuf, PathError> {
    Ok(vault.join(vault_relative(rel)?))
}
