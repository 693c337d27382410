// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error reporting specs

use crate::prelude::*;

#[test]
fn missing_vault_is_reported() {
    let vault = Vault::empty();
    vault
        .lv()
        .args(&["rename", "--vault", "/no/such/vault", "A.md", "B.md"])
        .fails()
        .stderr_has("is not a directory")
        .stderr_has("--vault");
}

#[test]
fn invalid_config_is_reported() {
    let vault = Vault::with(&[("A.md", "a")]);
    vault.config_toml("grace_window = \"whenever\"\n");
    vault
        .rename("A.md", "B.md")
        .fails()
        .stderr_has("config.toml");
    assert!(vault.exists("A.md"));
}

#[test]
fn unreadable_wal_show_explains_next_steps() {
    let vault = Vault::empty();
    std::fs::create_dir_all(vault.wal_dir()).unwrap();
    std::fs::write(vault.wal_dir().join("bad.wal.json"), "{ truncated").unwrap();

    vault
        .lv()
        .args(&["wal", "show", "bad.wal.json"])
        .fails()
        .stderr_has("cannot read WAL")
        .stderr_has("suggestions:");
}
