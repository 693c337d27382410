// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Direct (non-transactional) rename specs

use crate::prelude::*;

#[test]
fn direct_rename_rewrites_without_wal() {
    let vault = Vault::with(&[("A.md", "a"), ("one.md", "[[A]]"), ("two.md", "[[A|x]]")]);

    vault
        .rename("A.md", "B.md")
        .args(&["--direct"])
        .passes()
        .stdout_has("renamed (direct): A.md -> B.md")
        .stdout_has("2 reference(s) in 2 file(s)");

    assert_eq!(vault.read("one.md"), "[[B]]");
    assert_eq!(vault.read("two.md"), "[[B|x]]");
    assert!(vault.exists("B.md"));
    assert!(!vault.wal_dir().exists());
}

#[test]
fn direct_rename_with_bad_request_fails() {
    let vault = Vault::with(&[("A.md", "a")]);
    vault
        .rename("A.md", "A.md")
        .args(&["--direct", "--format", "json"])
        .fails()
        .stdout_has("TRANSACTION_PLAN_FAILED");
}
