//! Audit entry types.
//!
//! One `AuditEntry` is recorded for every executed action and every artifact
//! write. Entries are never edited after creation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::StepState;

/// Outcome recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditResult {
    Success,
    Failed,
}

impl AuditResult {
    /// Map a settled step state onto an audit result.
    ///
    /// Only `Failed` is recorded as a failure; every other state the
    /// handlers produce is a success.
    pub fn from_state(state: StepState) -> Self {
        if state == StepState::Failed {
            AuditResult::Failed
        } else {
            AuditResult::Success
        }
    }
}

impl fmt::Display for AuditResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditResult::Success => f.write_str("SUCCESS"),
            AuditResult::Failed => f.write_str("FAILED"),
        }
    }
}

/// A single human-readable audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub ts: DateTime<Utc>,
    /// Step display name. Plain text so artifact writes can use "Build".
    pub step_name: String,
    pub action_name: String,
    pub result: AuditResult,
    pub message: String,
}
