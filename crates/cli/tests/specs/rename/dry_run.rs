// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dry-run specs

use crate::prelude::*;

#[test]
fn dry_run_reports_plan_and_changes_nothing() {
    let vault = Vault::with(&[
        ("A.md", "# A\n"),
        ("one.md", "[[A]] [[A#Intro]]\n"),
        ("two.md", "![[A]]\n"),
    ]);

    vault
        .rename("A.md", "B.md")
        .args(&["--dry-run"])
        .passes()
        .stdout_has("would rename: A.md -> B.md")
        .stdout_has("3 reference(s) in 2 file(s)")
        .stdout_has("one.md (2)")
        .stdout_has("two.md (1)");

    assert!(vault.exists("A.md"));
    assert!(!vault.exists("B.md"));
    assert_eq!(vault.read("one.md"), "[[A]] [[A#Intro]]\n");
    assert!(vault.wal_files().is_empty());
}

#[test]
fn dry_run_json_lists_files() {
    let vault = Vault::with(&[("A.md", "a"), ("one.md", "[[A]]")]);
    let run = vault
        .rename("A.md", "B.md")
        .args(&["--dry-run", "--format", "json"])
        .passes();

    let json = run.stdout_json();
    assert_eq!(json["total_references"], 1);
    assert_eq!(json["files"][0]["path"], "one.md");
}

#[test]
fn dry_run_refuses_invalid_request() {
    let vault = Vault::with(&[("A.md", "a"), ("notes.txt", "")]);
    vault
        .rename("A.md", "notes.txt")
        .args(&["--dry-run"])
        .fails()
        .stdout_has("rename refused")
        .stdout_has("not a markdown note");
}
