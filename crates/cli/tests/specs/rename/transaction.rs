// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transactional rename specs

use crate::prelude::*;

fn linked() -> Vault {
    Vault::with(&[
        ("Projects/A.md", "# A\n"),
        ("index.md", "Start at [[A]] or [[Projects/A|the project]].\n"),
        ("other.md", "Nothing to see.\n"),
    ])
}

#[test]
fn rename_moves_note_and_rewrites_links() {
    let vault = linked();
    vault
        .rename("Projects/A.md", "Archive/B.md")
        .passes()
        .stdout_has("renamed: Projects/A.md -> Archive/B.md")
        .stdout_has("2 reference(s) in 1 file(s)");

    assert!(!vault.exists("Projects/A.md"));
    assert_eq!(vault.read("Archive/B.md"), "# A\n");
    assert_eq!(
        vault.read("index.md"),
        "Start at [[B]] or [[Archive/B|the project]].\n"
    );
    assert_eq!(vault.read("other.md"), "Nothing to see.\n");
    assert!(vault.wal_files().is_empty());
}

#[test]
fn json_output_is_a_transaction_result() {
    let vault = linked();
    let run = vault
        .rename("Projects/A.md", "Projects/B.md")
        .args(&["--format", "json"])
        .passes();

    let json = run.stdout_json();
    assert_eq!(json["success"], true);
    assert_eq!(json["final_phase"], "success");
    assert!(json["correlation_id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(json["link_updates"]["files_updated"], 1);
    assert!(json["metrics"]["total_time_ms"].is_u64());
}

#[test]
fn no_links_leaves_references_alone() {
    let vault = linked();
    vault
        .rename("Projects/A.md", "Projects/B.md")
        .args(&["--no-links"])
        .passes();

    assert!(vault.exists("Projects/B.md"));
    assert_eq!(
        vault.read("index.md"),
        "Start at [[A]] or [[Projects/A|the project]].\n"
    );
}

#[test]
fn existing_destination_fails_without_changes() {
    let vault = linked();
    vault.file("Projects/B.md", "# B\n");

    let run = vault
        .rename("Projects/A.md", "Projects/B.md")
        .args(&["--format", "json"])
        .fails();

    let json = run.stdout_json();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "TRANSACTION_PLAN_FAILED");
    assert_eq!(vault.read("Projects/B.md"), "# B\n");
    assert_eq!(vault.read("Projects/A.md"), "# A\n");
    assert!(vault.wal_files().is_empty());
}

#[test]
fn missing_source_fails_with_structured_error() {
    let vault = linked();
    vault
        .rename("Projects/Nope.md", "Projects/B.md")
        .fails()
        .stdout_has("rename failed")
        .stdout_has("does not exist");
}
