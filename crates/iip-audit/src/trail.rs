//! Bounded audit trail.
//!
//! `AuditTrail` keeps the most recent entries first and silently drops the
//! oldest once `CAPACITY` is exceeded. It is a window of visible history,
//! not a durable log: it lives and dies with the session.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use iip_contracts::audit::AuditEntry;

/// Reverse-chronological, size-bounded list of audit entries.
///
/// Entries are only ever added at the front. The only removal path is
/// truncation of the tail on `append`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditTrail {
    entries: VecDeque<AuditEntry>,
}

impl AuditTrail {
    /// Maximum number of entries retained.
    pub const CAPACITY: usize = 20;

    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `entry` at index 0 and drop anything beyond `CAPACITY`.
    pub fn append(&mut self, entry: AuditEntry) {
        info!(
            step = %entry.step_name,
            action = %entry.action_name,
            result = %entry.result,
            message = %entry.message,
            "audit entry recorded"
        );

        self.entries.push_front(entry);
        if self.entries.len() > Self::CAPACITY {
            let dropped = self.entries.len() - Self::CAPACITY;
            self.entries.truncate(Self::CAPACITY);
            debug!(dropped, "audit trail truncated");
        }
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter()
    }

    /// The most recent entry.
    pub fn latest(&self) -> Option<&AuditEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the visible history, most recent first.
    pub fn to_vec(&self) -> Vec<AuditEntry> {
        self.entries.iter().cloned().collect()
    }
}
