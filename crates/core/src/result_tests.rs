// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn restored(path: &str) -> RolledBackEntry {
    RolledBackEntry {
        kind: EntryKind::LinkUpdate,
        path: PathBuf::from(path),
        restored: true,
    }
}

#[test]
fn clean_rollback_needs_no_instructions() {
    let result = RollbackResult::new(vec![restored("a.md")], Vec::new(), None, None);
    assert!(result.success);
    assert!(!result.partial_recovery);
    assert!(!result.manual_recovery_required);
    assert!(result.recovery_instructions.is_none());
    assert_eq!(result.restored_count(), 1);
}

#[test]
fn failed_rollback_references_wal_and_backups() {
    let result = RollbackResult::new(
        vec![restored("a.md")],
        vec![RollbackFailure {
            kind: EntryKind::NoteRename,
            path: PathBuf::from("Projects/A.md"),
            error: "permission denied".to_string(),
        }],
        Some(Path::new("/cfg/wal/x.wal.json")),
        Some(Path::new("/cfg/wal/backups/tx-1")),
    );

    assert!(!result.success);
    assert!(result.partial_recovery);
    assert!(result.manual_recovery_required);

    let steps = result.recovery_instructions.unwrap();
    assert!(steps[0].contains("/cfg/wal/x.wal.json"));
    assert!(steps.iter().any(|s| s.contains("Projects/A.md")));
    assert!(steps.iter().any(|s| s.contains("/cfg/wal/backups/tx-1")));
}

#[test]
fn result_json_omits_absent_sections() {
    let result = TransactionResult {
        success: true,
        correlation_id: "tx-1".to_string(),
        final_phase: Phase::Success,
        note_rename: None,
        link_updates: None,
        rollback: None,
        error: None,
        metrics: TransactionMetrics::default(),
    };
    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("error").is_none());
    assert_eq!(json["final_phase"], "success");
}

#[test]
fn failure_from_error_carries_code_and_hint() {
    let error = TransactionError::CommitFailed {
        path: PathBuf::from("a.md"),
        reason: "io".to_string(),
    };
    let failure = TransactionFailure::from_error(&error, Some(PathBuf::from("/wal/x")));
    assert_eq!(failure.code, TransactionErrorCode::CommitFailed);
    assert_eq!(failure.recovery_action, RecoveryAction::Retry);
    assert_eq!(failure.message, "commit failed at a.md: io");
}

#[test]
fn metrics_lookup_by_phase() {
    let metrics = TransactionMetrics {
        total_time_ms: 12,
        phase_timings: vec![
            PhaseTiming { phase: Phase::Plan, duration_ms: 4 },
            PhaseTiming { phase: Phase::Commit, duration_ms: 8 },
        ],
    };
    assert_eq!(metrics.timing(Phase::Commit), Some(8));
    assert_eq!(metrics.timing(Phase::Validate), None);
}
