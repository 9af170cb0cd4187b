//! # iip-contracts
//!
//! Shared types, artifacts, and error contracts for the IIP agent console.
//!
//! Every crate in the workspace imports from here. No business logic lives
//! in this crate, only data definitions, small lookups and error types.

pub mod approval;
pub mod artifacts;
pub mod audit;
pub mod error;
pub mod execution;
pub mod judge;
pub mod pipeline;

#[cfg(test)]
mod tests {
    use super::*;
    use approval::{ApprovalRequest, Confirmation, SAVE_ARTIFACTS_ACTION};
    use artifacts::{BuildArtifacts, TestReport, DATAWEAVE_PATH, MULE_APP_PATH, PROPERTIES_PATH};
    use audit::AuditResult;
    use error::ConsoleError;
    use pipeline::{ActionItem, ActionKind, Env, Risk, StepId, StepName, StepState};
    use serde_json::json;

    // ── Env ──────────────────────────────────────────────────────────────────

    #[test]
    fn env_parses_case_insensitively() {
        assert_eq!("dev".parse::<Env>().unwrap(), Env::Dev);
        assert_eq!("Stg".parse::<Env>().unwrap(), Env::Stg);
        assert_eq!("PRD".parse::<Env>().unwrap(), Env::Prd);
        assert!("prod".parse::<Env>().is_err());
    }

    #[test]
    fn only_prd_is_production() {
        assert!(!Env::Dev.is_production());
        assert!(!Env::Stg.is_production());
        assert!(Env::Prd.is_production());
    }

    #[test]
    fn env_serializes_as_uppercase_label() {
        assert_eq!(serde_json::to_string(&Env::Prd).unwrap(), "\"PRD\"");
    }

    // ── ActionItem ───────────────────────────────────────────────────────────

    #[test]
    fn gated_action_requires_approval() {
        let action = ActionItem::gated(Risk::High, &["FR-301"], "Deploy Instance", "d", "/x", json!({}));
        assert!(action.requires_approval);
        assert!(action.tags.automated);
        assert!(action.tags.human_approval);
        assert!(!action.tags.consultative);
    }

    #[test]
    fn consultative_action_has_no_endpoint_or_payload() {
        let action = ActionItem::consultative(Risk::Low, &["FR-006"], "Show Assumptions", "d");
        assert!(!action.requires_approval);
        assert!(action.tags.consultative);
        assert!(action.api_endpoint.is_empty());
        assert!(action.payload_template.is_null());
    }

    #[test]
    fn without_approval_keeps_identity() {
        let action = ActionItem::gated(Risk::High, &[], "Apply Patch (Commit)", "d", "/x", json!({}));
        let cleared = action.without_approval();
        assert!(!cleared.requires_approval);
        assert_eq!(cleared.id, action.id);
        assert_eq!(cleared.name, action.name);
        // The human-approval tag describes the action; only the flag is cleared.
        assert!(cleared.tags.human_approval);
    }

    // ── ActionKind ───────────────────────────────────────────────────────────

    #[test]
    fn action_kind_resolves_every_known_pair() {
        for kind in ActionKind::ALL {
            assert_eq!(ActionKind::resolve(kind.step(), kind.name()), Some(kind));
        }
    }

    #[test]
    fn action_kind_requires_matching_step() {
        assert_eq!(ActionKind::resolve(StepName::Design, "Compile Intent"), None);
        assert_eq!(ActionKind::resolve(StepName::Intent, "compile intent"), None);
    }

    #[test]
    fn consultative_kinds_use_fallback_delay() {
        assert_eq!(ActionKind::ShowAssumptions.simulated_delay(), pipeline::FALLBACK_DELAY);
        assert_eq!(ActionKind::DeployInstance.simulated_delay().as_millis(), 800);
    }

    // ── Audit ────────────────────────────────────────────────────────────────

    #[test]
    fn audit_result_from_state() {
        assert_eq!(AuditResult::from_state(StepState::Failed), AuditResult::Failed);
        assert_eq!(AuditResult::from_state(StepState::Success), AuditResult::Success);
        assert_eq!(serde_json::to_string(&AuditResult::Failed).unwrap(), "\"FAILED\"");
    }

    // ── Approval ─────────────────────────────────────────────────────────────

    #[test]
    fn save_request_is_high_risk() {
        let request = ApprovalRequest::save_artifacts();
        assert_eq!(request.action_name(), SAVE_ARTIFACTS_ACTION);
        assert_eq!(request.risk(), Risk::High);
    }

    #[test]
    fn action_request_reports_action_name_and_risk() {
        let action = ActionItem::gated(Risk::Medium, &[], "Run API Tests", "d", "/x", json!({}));
        let request = ApprovalRequest::Action {
            step_id: StepId::new(),
            step_name: StepName::Test,
            action,
        };
        assert_eq!(request.action_name(), "Run API Tests");
        assert_eq!(request.risk(), Risk::Medium);
    }

    #[test]
    fn confirmation_defaults_second_flag_when_absent() {
        let c: Confirmation = serde_json::from_str(r#"{"typed":"APPROVE"}"#).unwrap();
        assert_eq!(c.typed, "APPROVE");
        assert!(!c.second_confirmation);
    }

    // ── Artifacts ────────────────────────────────────────────────────────────

    #[test]
    fn build_targets_are_written_in_fixed_order() {
        let build = BuildArtifacts {
            mule_xml: "x".to_string(),
            data_weave: "d".to_string(),
            properties: "p".to_string(),
        };
        let paths: Vec<&str> = build.targets().iter().map(|(p, _)| *p).collect();
        assert_eq!(paths, vec![MULE_APP_PATH, DATAWEAVE_PATH, PROPERTIES_PATH]);
    }

    #[test]
    fn test_report_is_tagged_by_phase() {
        let report = TestReport::Executed(artifacts::ExecutionReport {
            executed_at: chrono::Utc::now(),
            total: 0,
            results: vec![],
        });
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["phase"], "EXECUTED");
        assert!(report.judged().is_none());
    }

    // ── Progress ─────────────────────────────────────────────────────────────

    #[test]
    fn open_request_is_not_settled() {
        let progress = execution::Progress::AwaitingApproval { request: ApprovalRequest::save_artifacts() };
        let err = progress.settled().unwrap_err();
        assert!(matches!(err, ConsoleError::Unsettled { ref action } if action == SAVE_ARTIFACTS_ACTION));
    }

    // ── ConsoleError display messages ────────────────────────────────────────

    #[test]
    fn error_approval_pending_display() {
        let err = ConsoleError::ApprovalPending { action: "Deploy Instance".to_string() };
        assert!(err.to_string().contains("Deploy Instance"));
    }

    #[test]
    fn error_invalid_path_display_matches_wire_message() {
        assert_eq!(ConsoleError::InvalidPath.to_string(), "Invalid path");
    }

    #[test]
    fn error_write_failed_display() {
        let err = ConsoleError::WriteFailed {
            path: "artifacts/mule/config.properties".to_string(),
            reason: "read-only file system".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("config.properties"));
        assert!(msg.contains("read-only"));
    }
}
