//! # iip-audit
//!
//! Human-readable audit trail for the IIP agent console.
//!
//! ## Overview
//!
//! Every executed action, and every artifact write, produces one
//! `AuditEntry`. The trail keeps the 20 most recent entries with the newest
//! at index 0. Nothing is persisted.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use iip_audit::AuditTrail;
//!
//! let mut trail = AuditTrail::new();
//! trail.append(entry);
//! assert_eq!(trail.latest(), Some(&entry));
//! ```

pub mod trail;

pub use trail::AuditTrail;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use iip_contracts::audit::{AuditEntry, AuditResult};

    use super::AuditTrail;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn make_entry(n: usize) -> AuditEntry {
        AuditEntry {
            ts: Utc::now(),
            step_name: "Intent".to_string(),
            action_name: format!("action-{n}"),
            result: AuditResult::Success,
            message: format!("entry {n}"),
        }
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_empty_trail() {
        let trail = AuditTrail::new();
        assert!(trail.is_empty());
        assert_eq!(trail.len(), 0);
        assert!(trail.latest().is_none());
    }

    /// The newest entry is always at index 0.
    #[test]
    fn test_append_prepends() {
        let mut trail = AuditTrail::new();
        trail.append(make_entry(1));
        trail.append(make_entry(2));
        trail.append(make_entry(3));

        let names: Vec<String> = trail.entries().map(|e| e.action_name.clone()).collect();
        assert_eq!(names, vec!["action-3", "action-2", "action-1"]);
        assert_eq!(trail.latest().unwrap().action_name, "action-3");
    }

    /// No matter how many entries are appended, at most CAPACITY survive and
    /// they are the most recent ones.
    #[test]
    fn test_capacity_bound() {
        let mut trail = AuditTrail::new();
        for n in 0..57 {
            trail.append(make_entry(n));
            assert!(trail.len() <= AuditTrail::CAPACITY);
        }

        assert_eq!(trail.len(), AuditTrail::CAPACITY);
        let entries = trail.to_vec();
        assert_eq!(entries[0].action_name, "action-56");
        assert_eq!(entries[AuditTrail::CAPACITY - 1].action_name, "action-37");
    }

    /// Entries that survive truncation are not altered.
    #[test]
    fn test_entries_unchanged_by_truncation() {
        let mut trail = AuditTrail::new();
        let first = make_entry(0);
        trail.append(first.clone());
        for n in 1..AuditTrail::CAPACITY {
            trail.append(make_entry(n));
        }

        assert_eq!(trail.to_vec().last(), Some(&first));
        trail.append(make_entry(99));
        assert!(!trail.to_vec().contains(&first));
    }

    /// The trail serializes as a plain list, newest first.
    #[test]
    fn test_serializes_as_list() {
        let mut trail = AuditTrail::new();
        trail.append(make_entry(1));
        trail.append(make_entry(2));

        let value = serde_json::to_value(&trail).unwrap();
        let list = value.as_array().expect("trail must serialize as an array");
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["actionName"], "action-2");
        assert_eq!(list[0]["result"], "SUCCESS");
    }
}
