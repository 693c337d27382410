// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration directory specs

use crate::prelude::*;

#[test]
fn logs_are_written_under_config_dir() {
    let vault = Vault::with(&[("A.md", "a"), ("index.md", "[[A]]")]);
    vault.rename("A.md", "B.md").passes();

    let log = std::fs::read_to_string(vault.config_dir().join("logs/lv.log")).unwrap();
    assert!(log.contains("committed"), "{log}");
}

#[test]
fn wal_dir_lives_under_config_dir_not_vault() {
    let vault = Vault::with(&[("A.md", "a")]);
    vault.abandoned_rename("A.md", "B.md", false);

    assert_eq!(vault.wal_files().len(), 1);
    assert!(!vault.path().join("wal").exists());
}

#[test]
fn grace_window_comes_from_config_toml() {
    let vault = Vault::with(&[("A.md", "a")]);
    vault.config_toml("grace_window = \"1h\"\n");
    vault.abandoned_rename("A.md", "B.md", true);

    vault
        .lv()
        .args(&["recover"])
        .passes()
        .stdout_has("nothing to recover");
    assert!(vault.exists("B.md"));
    assert_eq!(vault.wal_files().len(), 1);
}
