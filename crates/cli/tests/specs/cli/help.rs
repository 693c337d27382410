// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    Vault::empty()
        .lv()
        .args(&["--help"])
        .passes()
        .stdout_has("rename")
        .stdout_has("recover")
        .stdout_has("wal");
}

#[test]
fn rename_help_shows_modes() {
    Vault::empty()
        .lv()
        .args(&["rename", "--help"])
        .passes()
        .stdout_has("--dry-run")
        .stdout_has("--direct")
        .stdout_has("--no-links");
}

#[test]
fn dry_run_and_direct_conflict() {
    let vault = Vault::with(&[("A.md", "a")]);
    vault
        .rename("A.md", "B.md")
        .args(&["--dry-run", "--direct"])
        .fails()
        .stderr_has("cannot be used with");
}
