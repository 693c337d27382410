// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL inspection specs

use crate::prelude::*;

#[test]
fn wal_list_when_empty() {
    Vault::empty()
        .lv()
        .args(&["wal", "list"])
        .passes()
        .stdout_has("No pending transactions");
}

#[test]
fn wal_list_shows_pending_entries_without_recovering() {
    let vault = Vault::with(&[("A.md", "a")]);
    vault.abandoned_rename("A.md", "B.md", true);

    vault
        .lv()
        .args(&["wal", "list"])
        .passes()
        .stdout_has("crashed-A")
        .stdout_has("commit")
        .stdout_has("pid=5000000")
        .stdout_has("1/1");

    // Inspection never triggers recovery
    assert!(vault.exists("B.md"));
    assert_eq!(vault.wal_files().len(), 1);
}

#[test]
fn wal_list_flags_unreadable_files() {
    let vault = Vault::empty();
    std::fs::create_dir_all(vault.wal_dir()).unwrap();
    std::fs::write(vault.wal_dir().join("bad.wal.json"), "not json").unwrap();

    vault
        .lv()
        .args(&["wal", "list"])
        .passes()
        .stdout_has("UNREADABLE bad.wal.json");
}

#[test]
fn wal_show_prints_entry() {
    let vault = Vault::with(&[("A.md", "a")]);
    let wal = vault.abandoned_rename("A.md", "B.md", false);

    vault
        .lv()
        .args(&["wal", "show", wal.to_str().unwrap()])
        .passes()
        .stdout_has("transaction crashed-A (rename)")
        .stdout_has("note: A.md -> B.md [pending]");
}

#[test]
fn wal_show_json_is_the_raw_entry() {
    let vault = Vault::with(&[("A.md", "a")]);
    let wal = vault.abandoned_rename("A.md", "B.md", false);

    let run = vault
        .lv()
        .args(&["wal", "show", wal.to_str().unwrap(), "--format", "json"])
        .passes();

    let json = run.stdout_json();
    assert_eq!(json["version"], 1);
    assert_eq!(json["operation"], "rename");
    assert_eq!(json["pid"], 5_000_000);
    assert!(json["checksum"].is_u64());
}

#[test]
fn unreadable_wal_does_not_block_recovery_of_others() {
    let vault = Vault::with(&[("A.md", "a")]);
    vault.config_toml("grace_window = \"0s\"\n");
    vault.abandoned_rename("A.md", "B.md", true);
    std::fs::write(vault.wal_dir().join("bad.wal.json"), "not json").unwrap();

    vault
        .lv()
        .args(&["recover"])
        .fails()
        .stdout_has("recovered 1 of 2");

    assert!(vault.exists("A.md"));
    assert!(vault.wal_dir().join("bad.wal.json").exists());
}
