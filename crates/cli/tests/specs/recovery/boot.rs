// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Boot recovery specs

use crate::prelude::*;

#[test]
fn recover_rolls_back_abandoned_rename() {
    let vault = Vault::with(&[("A.md", "# A\n")]);
    vault.abandoned_rename("A.md", "B.md", true);
    assert!(vault.exists("B.md"));

    vault
        .lv()
        .args(&["recover"])
        .passes()
        .stdout_has("recovered 1 of 1")
        .stdout_has("crashed-A")
        .stdout_has("1 restored");

    assert_eq!(vault.read("A.md"), "# A\n");
    assert!(!vault.exists("B.md"));
    assert!(vault.wal_files().is_empty());
}

#[test]
fn recover_with_nothing_pending() {
    Vault::empty()
        .lv()
        .args(&["recover"])
        .passes()
        .stdout_has("nothing to recover");
}

#[test]
fn rename_recovers_before_running() {
    let vault = Vault::with(&[("A.md", "a"), ("C.md", "c"), ("index.md", "[[C]]")]);
    vault.abandoned_rename("A.md", "B.md", true);

    vault.rename("C.md", "D.md").passes();

    assert!(vault.exists("A.md"), "abandoned rename rolled back");
    assert!(!vault.exists("B.md"));
    assert!(vault.exists("D.md"));
    assert_eq!(vault.read("index.md"), "[[D]]");
    assert!(vault.wal_files().is_empty());
}

#[test]
fn recover_refuses_to_clobber_and_exits_nonzero() {
    let vault = Vault::with(&[("A.md", "# A\n")]);
    vault.abandoned_rename("A.md", "B.md", true);
    // Someone recreated the old name after the crash
    vault.file("A.md", "new A\n");

    vault
        .lv()
        .args(&["recover"])
        .fails()
        .stdout_has("FAILED")
        .stderr_has("could not be recovered")
        .stderr_has("lv wal list");

    assert_eq!(vault.read("A.md"), "new A\n");
    assert!(vault.exists("B.md"));
    assert_eq!(vault.wal_files().len(), 1);
}

#[test]
fn recover_json_report() {
    let vault = Vault::with(&[("A.md", "a")]);
    vault.abandoned_rename("A.md", "B.md", false);

    let run = vault.lv().args(&["recover", "--format", "json"]).passes();

    let json = run.stdout_json();
    assert_eq!(json["scanned"], 1);
    assert_eq!(json["recovered"], 1);
    assert_eq!(json["outcomes"][0]["success"], true);
}
