// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end rename transactions against a real temporary vault

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use common::Harness;
use lv_adapters::FsOp;
use lv_core::{EntryKind, Phase, RecoveryAction, TransactionError, TransactionErrorCode};
use lv_engine::RenameRequest;
use std::path::{Path, PathBuf};

const NOTE: &str = "# A\nSee also [[A]] for context.\n";

fn linked_vault() -> Harness {
    Harness::new(&[
        ("Projects/A.md", NOTE),
        ("index.md", "Start at [[A]].\n"),
        ("daily/2026-01-02.md", "Met about [[A#Agenda|the plan]] and [[Other]].\n"),
        ("other.md", "[[AB]] is unrelated.\n"),
    ])
}

fn rename_a() -> RenameRequest {
    RenameRequest::new("Projects/A.md", "Projects/B.md", true)
}

fn assert_untouched(h: &Harness, before: &std::collections::BTreeMap<PathBuf, String>) {
    similar_asserts::assert_eq!(&h.snapshot(), before);
    assert!(h.wal_files().is_empty(), "WAL left behind: {:?}", h.wal_files());
}

#[tokio::test]
async fn happy_path_moves_note_and_rewrites_links() {
    let h = linked_vault();
    let result = h.manager().execute(rename_a()).await;

    assert!(result.success, "{result}");
    assert_eq!(result.final_phase, Phase::Success);
    assert!(!h.exists("Projects/A.md"));
    assert_eq!(h.read("Projects/B.md"), NOTE);
    assert_eq!(h.read("index.md"), "Start at [[B]].\n");
    assert_eq!(
        h.read("daily/2026-01-02.md"),
        "Met about [[B#Agenda|the plan]] and [[Other]].\n"
    );
    assert_eq!(h.read("other.md"), "[[AB]] is unrelated.\n");

    let links = result.link_updates.unwrap();
    assert_eq!(links.files_updated, 2);
    assert_eq!(links.references_updated, 2);
    assert!(h.wal_files().is_empty());
    assert!(h.backup_files().is_empty());
    assert!(h
        .snapshot()
        .keys()
        .all(|p| !p.to_string_lossy().contains("/.") && !p.to_string_lossy().starts_with('.')));
}

#[tokio::test]
async fn happy_path_records_every_phase() {
    let h = linked_vault();
    let result = h.manager().execute(rename_a()).await;

    let phases: Vec<Phase> = result.metrics.phase_timings.iter().map(|t| t.phase).collect();
    assert_eq!(
        phases,
        vec![Phase::Plan, Phase::Prepare, Phase::Validate, Phase::Commit, Phase::Success]
    );
    assert_eq!(result.correlation_id, "tx-1");
}

#[tokio::test]
async fn rename_without_link_updates_leaves_links() {
    let h = linked_vault();
    let result = h
        .manager()
        .execute(RenameRequest::new("Projects/A.md", "Archive/A2.md", false))
        .await;

    assert!(result.success, "{result}");
    assert!(h.exists("Archive/A2.md"));
    assert_eq!(h.read("index.md"), "Start at [[A]].\n");
    assert_eq!(result.link_updates.unwrap().files_updated, 0);
}

#[tokio::test]
async fn absolute_paths_inside_vault_are_accepted() {
    let h = linked_vault();
    let request = RenameRequest::new(h.path("Projects/A.md"), h.path("Projects/B.md"), true);
    let result = h.manager().execute(request).await;
    assert!(result.success, "{result}");
    assert_eq!(result.note_rename.unwrap().to, PathBuf::from("Projects/B.md"));
}

#[yare::parameterized(
    missing_source = { "Projects/Missing.md", "Projects/B.md" },
    destination_exists = { "Projects/A.md", "index.md" },
    escapes_vault = { "Projects/A.md", "../outside.md" },
    not_a_note = { "Projects/A.md", "Projects/B.txt" },
    same_path = { "Projects/A.md", "./Projects/A.md" },
)]
#[test_macro(tokio::test)]
async fn plan_failures_touch_nothing(from: &str, to: &str) {
    let h = linked_vault();
    let before = h.snapshot();

    let result = h.manager().execute(RenameRequest::new(from, to, true)).await;

    assert!(!result.success);
    assert_eq!(result.final_phase, Phase::Abort);
    assert_eq!(result.error_code(), Some(TransactionErrorCode::PlanFailed));
    assert!(result.rollback.is_none());
    assert_untouched(&h, &before);
}

#[tokio::test]
async fn stale_file_between_prepare_and_validate_is_left_as_modified() {
    let h = linked_vault();
    let manager = h.manager();

    let state = manager.plan("tx-stale", &rename_a()).await.unwrap();
    let state = manager.prepare(state).await.unwrap();
    assert_eq!(h.wal_files().len(), 1);

    h.write("index.md", "Start at [[A]]. Edited concurrently.\n");
    let failure = manager.validate(state).await.unwrap_err();
    assert_eq!(
        failure.error,
        TransactionError::StaleContent {
            affected_files: vec![PathBuf::from("index.md")]
        }
    );

    let (state, rollback) = manager.abort(failure.state, &failure.error).await;
    assert_eq!(state.phase, Phase::Abort);
    assert!(rollback.success);
    assert_eq!(h.read("index.md"), "Start at [[A]]. Edited concurrently.\n");
    assert_eq!(h.read("Projects/A.md"), NOTE);
    assert!(!h.exists("Projects/B.md"));
    assert!(h.wal_files().is_empty());
    assert!(h.backup_files().is_empty());
}

#[tokio::test]
async fn stale_file_between_plan_and_prepare_is_rejected() {
    let h = linked_vault();
    let manager = h.manager();

    let state = manager.plan("tx-stale", &rename_a()).await.unwrap();
    h.write("daily/2026-01-02.md", "rewritten by sync\n");

    let failure = manager.prepare(state).await.unwrap_err();
    assert_eq!(failure.error.code(), TransactionErrorCode::StaleContent);

    let (_, rollback) = manager.abort(failure.state, &failure.error).await;
    assert!(rollback.success);
    assert_eq!(h.read("daily/2026-01-02.md"), "rewritten by sync\n");
    assert!(h.wal_files().is_empty());
}

#[tokio::test]
async fn stale_file_during_commit_rolls_back_earlier_promotions() {
    let h = linked_vault();
    let manager = h.manager();

    let state = manager.plan("tx-race", &rename_a()).await.unwrap();
    let state = manager.prepare(state).await.unwrap();
    let state = manager.validate(state).await.unwrap();

    // Commits in path order: daily/... is promoted before index.md
    h.write("index.md", "concurrent edit\n");
    let failure = manager.commit(state).await.unwrap_err();
    assert_eq!(failure.error.code(), TransactionErrorCode::StaleContent);
    assert!(failure.state.manifest.note_rename.completed);

    let (_, rollback) = manager.abort(failure.state, &failure.error).await;
    assert!(rollback.success, "{rollback:?}");
    assert_eq!(h.read("index.md"), "concurrent edit\n");
    assert_eq!(
        h.read("daily/2026-01-02.md"),
        "Met about [[A#Agenda|the plan]] and [[Other]].\n"
    );
    assert_eq!(h.read("Projects/A.md"), NOTE);
    assert!(!h.exists("Projects/B.md"));
}

#[tokio::test]
async fn destination_created_during_commit_is_never_replaced() {
    let h = linked_vault();
    let manager = h.manager();

    let state = manager.plan("tx-dest", &rename_a()).await.unwrap();
    let state = manager.prepare(state).await.unwrap();
    let state = manager.validate(state).await.unwrap();

    h.write("Projects/B.md", "created by another app\n");
    let failure = manager.commit(state).await.unwrap_err();
    assert_eq!(failure.error.code(), TransactionErrorCode::CommitFailed);
    assert!(!failure.state.manifest.note_rename.completed);

    let (_, rollback) = manager.abort(failure.state, &failure.error).await;
    assert!(rollback.success, "{rollback:?}");
    assert_eq!(h.read("Projects/B.md"), "created by another app\n");
    assert_eq!(h.read("Projects/A.md"), NOTE);
    assert_eq!(h.read("index.md"), "Start at [[A]].\n");
    assert!(h.wal_files().is_empty());
}

#[tokio::test]
async fn partial_commit_failure_is_rolled_back() {
    let h = linked_vault();
    let before = h.snapshot();
    h.fs.fail(FsOp::Rename, h.path("index.md"));

    let result = h.manager().execute(rename_a()).await;

    assert!(!result.success);
    assert_eq!(result.final_phase, Phase::Abort);
    assert_eq!(result.error_code(), Some(TransactionErrorCode::CommitFailed));

    let rollback = result.rollback.unwrap();
    assert!(rollback.success);
    assert!(!rollback.partial_recovery);
    let restored: Vec<(EntryKind, PathBuf)> = rollback
        .rolled_back
        .iter()
        .filter(|e| e.restored)
        .map(|e| (e.kind, e.path.clone()))
        .collect();
    assert_eq!(
        restored,
        vec![
            (EntryKind::LinkUpdate, PathBuf::from("daily/2026-01-02.md")),
            (EntryKind::NoteRename, PathBuf::from("Projects/A.md")),
        ]
    );
    assert_untouched(&h, &before);
    assert!(h.backup_files().is_empty());
}

#[tokio::test]
async fn staging_failure_removes_staged_files() {
    let h = linked_vault();
    let before = h.snapshot();
    // daily/ is staged first; index.md lives at the vault root
    h.fs.fail_under(FsOp::Write, h.vault.path());

    let result = h.manager().execute(rename_a()).await;

    assert_eq!(result.error_code(), Some(TransactionErrorCode::PrepareFailed));
    assert!(result.rollback.unwrap().success);
    assert_untouched(&h, &before);
}

#[tokio::test]
async fn failed_rollback_keeps_wal_and_explains_recovery() {
    let h = linked_vault();
    h.fs.fail(FsOp::Rename, h.path("index.md"));
    h.fs.fail(FsOp::Write, h.path("daily/2026-01-02.md"));

    let result = h.manager().execute(rename_a()).await;

    assert!(!result.success);
    let error = result.error.as_ref().unwrap();
    assert_eq!(error.code, TransactionErrorCode::RollbackFailed);
    assert_eq!(error.recovery_action, RecoveryAction::ManualRecovery);
    let wal_path = error.wal_path.clone().unwrap();
    assert!(wal_path.exists());
    assert!(!error.recovery_instructions.is_empty());
    assert!(error.recovery_instructions[0].contains(&wal_path.display().to_string()));

    let rollback = result.rollback.as_ref().unwrap();
    assert!(rollback.partial_recovery);
    assert!(rollback.manual_recovery_required);
    assert_eq!(rollback.failures.len(), 1);
    assert_eq!(rollback.failures[0].path, Path::new("daily/2026-01-02.md"));
    // The note itself was still moved back
    assert!(h.exists("Projects/A.md"));
    assert!(!h.backup_files().is_empty());

    let entry = h.manager().wal().read(&wal_path).await.unwrap();
    assert_eq!(entry.phase, Phase::Abort);
}

/// Fail every vault operation of a clean run, one at a time, and check the
/// vault always ends either fully renamed or byte-identical to the start.
#[tokio::test]
async fn every_single_fault_leaves_an_atomic_outcome() {
    let clean = linked_vault();
    let clean_result = clean.manager().execute(rename_a()).await;
    assert!(clean_result.success);
    let renamed = clean.snapshot();

    let mut points = Vec::new();
    for call in clean.fs.calls() {
        let rel = call.path.strip_prefix(clean.vault.path()).unwrap().to_path_buf();
        let hidden = rel
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with('.'));
        if hidden {
            continue;
        }
        let skip = points
            .iter()
            .filter(|(op, path, _)| *op == call.op && *path == rel)
            .count();
        points.push((call.op, rel, skip));
    }
    assert!(points.len() > 10, "expected a meaningful sweep, got {points:?}");

    for (op, rel, skip) in points {
        let h = linked_vault();
        let before = h.snapshot();
        h.fs.fail_nth(op, h.vault.path().join(&rel), skip);

        let result = h.manager().execute(rename_a()).await;
        let context = format!("fault {op:?} #{skip} on {}: {result}", rel.display());

        if result.success {
            similar_asserts::assert_eq!(h.snapshot(), renamed, "{context}");
        } else {
            assert!(result.rollback.as_ref().map_or(true, |r| r.success), "{context}");
            similar_asserts::assert_eq!(h.snapshot(), before, "{context}");
        }
        assert!(h.wal_files().is_empty(), "{context}");
    }
}
