// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transaction phase state machine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phases of the rename commit protocol.
///
/// `plan → prepare → validate → commit → success` on the happy path; any
/// non-terminal phase may move to `abort`. No phase is revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Plan,
    Prepare,
    Validate,
    Commit,
    Success,
    Abort,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Success | Phase::Abort)
    }

    /// The phase that follows on the happy path
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Plan => Some(Phase::Prepare),
            Phase::Prepare => Some(Phase::Validate),
            Phase::Validate => Some(Phase::Commit),
            Phase::Commit => Some(Phase::Success),
            Phase::Success | Phase::Abort => None,
        }
    }

    pub fn can_transition_to(self, target: Phase) -> bool {
        match target {
            Phase::Abort => !self.is_terminal(),
            _ => self.next() == Some(target),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Plan => "plan",
            Phase::Prepare => "prepare",
            Phase::Validate => "validate",
            Phase::Commit => "commit",
            Phase::Success => "success",
            Phase::Abort => "abort",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
