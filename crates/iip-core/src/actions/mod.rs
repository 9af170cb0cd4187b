//! Mock agent handlers, one per known action.
//!
//! A handler is a plain function from an `ActionContext` snapshot to an
//! `ActionOutcome`. Handlers never touch session state themselves: the
//! console applies the outcome through the reducer. Unmet preconditions are
//! ordinary outcomes (`Failed` plus a message naming the missing input).

mod build;
mod debug;
mod deploy;
mod design;
mod intent;
mod observe;

use chrono::{DateTime, Utc};

use iip_contracts::pipeline::{ActionKind, Env, StepName, StepState};

use crate::{
    session::{OutputUpdate, SessionOutputs},
    traits::Workspace,
};

/// Read-only view of everything a handler may consult.
pub struct ActionContext<'a> {
    pub env: Env,
    pub requirement: &'a str,
    pub outputs: &'a SessionOutputs,
    pub now: DateTime<Utc>,
    pub step_name: StepName,
    pub action_name: &'a str,
    pub workspace: &'a dyn Workspace,
    pub simulate_deploy_failure: bool,
}

/// What a handler decided.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    /// `Success` or `Failed`.
    pub state: StepState,
    /// Audit message.
    pub message: String,
    pub updates: Vec<OutputUpdate>,
}

impl ActionOutcome {
    pub fn success(message: impl Into<String>, updates: Vec<OutputUpdate>) -> Self {
        Self { state: StepState::Success, message: message.into(), updates }
    }

    /// A failure that stores nothing.
    pub fn failed(message: impl Into<String>) -> Self {
        Self { state: StepState::Failed, message: message.into(), updates: Vec::new() }
    }
}

pub type Handler = fn(&ActionContext<'_>) -> ActionOutcome;

/// Pick the handler for a resolved action.
///
/// Advisory actions have no dedicated mock yet and share the fallback with
/// unrecognised (step, action) pairs.
pub fn handler_for(kind: Option<ActionKind>) -> Handler {
    use ActionKind as K;
    let Some(kind) = kind else { return fallback };

    match kind {
        K::CompileIntent => intent::compile_intent,
        K::GenerateApiSpec => design::generate_api_spec,
        K::GenerateMuleApp | K::GenerateDataWeave => build::generate_mule_app,
        K::GenerateApiTestCases => test::generate_test_cases,
        K::RunApiTests => test::run_api_tests,
        K::AutoJudge => test::auto_judge,
        K::PredeployChecklist => deploy::predeploy_checklist,
        K::DeployInstance => deploy::deploy_instance,
        K::CollectEvidence => observe::collect_evidence,
        K::TraceDrilldown => debug::trace_drilldown,
        K::RootCauseLocalization => debug::root_cause_localization,
        K::ApplyPatch => debug::apply_patch,
        K::ShowAssumptions | K::SpecQualityReview | K::CodebaseQa | K::TroubleshootingSummary => fallback,
    }
}

/// Always succeeds and stores nothing.
pub fn fallback(ctx: &ActionContext<'_>) -> ActionOutcome {
    ActionOutcome::success(format!("Executed (mock): {}", ctx.action_name), Vec::new())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use iip_contracts::{
        artifacts::{ReleaseStatus, TestReport, PROPERTIES_PATH},
        judge::JudgeReport,
    };

    use super::*;
    use crate::{mock_data, workspace::MemoryWorkspace};

    // ── Harness ───────────────────────────────────────────────────────────────

    /// Runs handlers in sequence, folding their updates into `outputs` the
    /// way the reducer would.
    struct Harness {
        env: Env,
        outputs: SessionOutputs,
        workspace: MemoryWorkspace,
        simulate_deploy_failure: bool,
    }

    impl Harness {
        fn new(env: Env) -> Self {
            Self {
                env,
                outputs: SessionOutputs::default(),
                workspace: MemoryWorkspace::new(),
                simulate_deploy_failure: true,
            }
        }

        fn run(&mut self, kind: ActionKind) -> ActionOutcome {
            self.run_named(Some(kind), kind.step(), kind.name())
        }

        fn run_named(&mut self, kind: Option<ActionKind>, step: StepName, name: &str) -> ActionOutcome {
            let ctx = ActionContext {
                env: self.env,
                requirement: mock_data::DEFAULT_REQUIREMENT,
                outputs: &self.outputs,
                now: Utc.with_ymd_and_hms(2026, 2, 22, 10, 0, 0).unwrap(),
                step_name: step,
                action_name: name,
                workspace: &self.workspace,
                simulate_deploy_failure: self.simulate_deploy_failure,
            };
            let outcome = handler_for(kind)(&ctx);
            for update in outcome.updates.clone() {
                self.outputs.store(update);
            }
            outcome
        }

        fn judged(&self) -> &JudgeReport {
            self.outputs.test_report.as_ref().and_then(TestReport::judged).unwrap()
        }
    }

    // ── Fallback ──────────────────────────────────────────────────────────────

    #[test]
    fn test_unknown_pair_falls_back_to_success() {
        let mut h = Harness::new(Env::Dev);
        let outcome = h.run_named(None, StepName::Design, "Summon Dragons");
        assert_eq!(outcome.state, StepState::Success);
        assert_eq!(outcome.message, "Executed (mock): Summon Dragons");
        assert!(outcome.updates.is_empty());
    }

    #[test]
    fn test_consultative_actions_use_fallback() {
        let mut h = Harness::new(Env::Dev);
        let outcome = h.run(ActionKind::CodebaseQa);
        assert_eq!(outcome.message, "Executed (mock): Codebase Q&A");
    }

    // ── Preconditions ─────────────────────────────────────────────────────────

    #[test]
    fn test_unmet_preconditions_fail_with_messages() {
        let cases = [
            (ActionKind::GenerateApiSpec, "No Intent Output. Run 'Compile Intent' first."),
            (ActionKind::GenerateMuleApp, "Missing Intent or OAS. Run Intent → Design first."),
            (ActionKind::GenerateApiTestCases, "No OAS. Run Design step first."),
            (ActionKind::RunApiTests, "No API test cases. Run 'Generate API Test Cases' first."),
            (ActionKind::AutoJudge, "No test execution results. Run 'Run API Tests' first."),
            (ActionKind::CollectEvidence, "No deploy report. Run Deploy first."),
            (ActionKind::TraceDrilldown, "No evidence pack. Run Observe → Collect Evidence first."),
            (ActionKind::RootCauseLocalization, "No evidence pack."),
        ];

        for (kind, message) in cases {
            let mut h = Harness::new(Env::Dev);
            let outcome = h.run(kind);
            assert_eq!(outcome.state, StepState::Failed, "{kind:?}");
            assert_eq!(outcome.message, message);
            assert!(outcome.updates.is_empty());
        }
    }

    // ── Full pipeline ─────────────────────────────────────────────────────────

    #[test]
    fn test_intent_through_judge() {
        let mut h = Harness::new(Env::Dev);

        assert_eq!(h.run(ActionKind::CompileIntent).message, "Intent compiled and stored in session output.");
        assert_eq!(h.run(ActionKind::GenerateApiSpec).message, "OAS generated from Intent and stored in session output.");
        assert_eq!(
            h.run(ActionKind::GenerateDataWeave).message,
            "Mule flow + DataWeave + properties generated (demo) and stored in session output."
        );
        assert!(h.outputs.build.is_some());

        assert_eq!(h.run(ActionKind::GenerateApiTestCases).message, "Generated 4 API test cases from OAS.");
        let suite = h.outputs.test_suite.as_ref().unwrap();
        assert_eq!(suite.endpoint_under_test, "/accounts/{accountNo}");
        assert!(suite.cases[0].expect.schema.is_some());

        assert_eq!(h.run(ActionKind::RunApiTests).message, "Executed 4 API tests (mock). Ready for Auto-Judge.");

        let judge = h.run(ActionKind::AutoJudge);
        assert_eq!(judge.state, StepState::Failed);
        assert_eq!(judge.message, "Auto-judge complete. PassRate=75% (Failed=1).");

        let report = h.judged();
        let failed: Vec<_> = report.results.iter().filter(|r| !r.passed).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].case.id, "API-001");
        assert_eq!(
            failed[0].root_cause_hint.as_deref(),
            Some("DataWeave mapping/response builder is missing required field 'status'.")
        );
        assert!(report.results.iter().filter(|r| r.passed).all(|r| r.root_cause_hint.is_none()));
    }

    /// Judging a judged report re-uses its observations.
    #[test]
    fn test_rejudge_is_stable() {
        let mut h = Harness::new(Env::Dev);
        for kind in [
            ActionKind::CompileIntent,
            ActionKind::GenerateApiSpec,
            ActionKind::GenerateApiTestCases,
            ActionKind::RunApiTests,
            ActionKind::AutoJudge,
        ] {
            h.run(kind);
        }
        let first = h.judged().summary;
        let again = h.run(ActionKind::AutoJudge);
        assert_eq!(again.message, "Auto-judge complete. PassRate=75% (Failed=1).");
        assert_eq!(h.judged().summary, first);
    }

    #[test]
    fn test_checklist_runs_without_prerequisites() {
        let mut h = Harness::new(Env::Stg);
        let outcome = h.run(ActionKind::PredeployChecklist);
        assert_eq!(outcome.state, StepState::Success);
        assert_eq!(outcome.message, "Pre-deploy checklist complete (demo).");
        assert_eq!(h.outputs.deploy.as_ref().unwrap().checklist.as_ref().unwrap().env, Env::Stg);
    }

    #[test]
    fn test_seeded_deploy_failure_then_debug_cycle() {
        let mut h = Harness::new(Env::Dev);
        h.run(ActionKind::PredeployChecklist);

        let deploy = h.run(ActionKind::DeployInstance);
        assert_eq!(deploy.state, StepState::Failed);
        assert_eq!(deploy.message, format!("Deploy failed: {}", mock_data::DEPLOY_FAILURE_MESSAGE));
        let report = h.outputs.deploy.clone().unwrap();
        assert!(report.checklist.is_some());
        let release = report.release.unwrap();
        assert_eq!(release.status, ReleaseStatus::Failed);
        assert!(release.release_id.starts_with("rel-"));

        assert_eq!(h.run(ActionKind::CollectEvidence).message, "Evidence collected (logs/metrics/traces) and summarized.");
        let evidence = h.outputs.evidence.as_ref().unwrap();
        assert_eq!(evidence.release_id.as_deref(), Some(release.release_id.as_str()));
        assert_eq!(evidence.signals.logs[1].msg, mock_data::DEPLOY_FAILURE_MESSAGE);

        assert_eq!(h.run(ActionKind::TraceDrilldown).message, "Trace drilldown ready (demo).");
        assert_eq!(
            h.run(ActionKind::RootCauseLocalization).message,
            "Root cause localized with candidate list and recommended fix."
        );
        let debug = h.outputs.debug.as_ref().unwrap();
        assert_eq!(debug.trace.as_ref().unwrap().steps.len(), 3);
        assert_eq!(debug.root_cause.as_ref().unwrap().classification, "CONFIG");
    }

    #[test]
    fn test_successful_deploy_when_failure_disabled() {
        let mut h = Harness::new(Env::Prd);
        h.simulate_deploy_failure = false;

        let deploy = h.run(ActionKind::DeployInstance);
        assert_eq!(deploy.state, StepState::Success);
        let release = h.outputs.deploy.as_ref().unwrap().release.clone().unwrap();
        assert_eq!(deploy.message, format!("Deploy success: {}", release.release_id));
        assert_eq!(release.endpoint.as_deref(), Some("https://prd.api.example.com/accounts/{accountNo}"));

        let evidence = h.run(ActionKind::CollectEvidence);
        assert_eq!(evidence.state, StepState::Success);
        assert_eq!(h.outputs.evidence.as_ref().unwrap().signals.logs[1].msg, "Unknown error");
    }

    #[test]
    fn test_apply_patch_writes_and_updates_build() {
        let mut h = Harness::new(Env::Dev);
        h.outputs.build = Some(mock_data::build_artifacts());
        h.workspace = MemoryWorkspace::new().with_file(PROPERTIES_PATH, &mock_data::build_artifacts().properties);

        let outcome = h.run(ActionKind::ApplyPatch);
        assert_eq!(outcome.state, StepState::Success);
        assert_eq!(outcome.message, "Patch applied to artifacts/mule/config.properties (approved).");

        assert_eq!(h.workspace.get(PROPERTIES_PATH).as_deref(), Some(mock_data::PATCHED_PROPERTIES));
        assert_eq!(h.outputs.build.as_ref().unwrap().properties, mock_data::PATCHED_PROPERTIES);

        let patch = h.outputs.patch.as_ref().unwrap();
        let file = &patch.files[0];
        assert!(file.diff.contains("- http.port=8081"));
        assert!(file.diff.contains("+ http.port=8082"));
        assert!(file.before_sha256.is_some());
        assert_eq!(file.after_sha256, crate::workspace::digest(mock_data::PATCHED_PROPERTIES));
        assert!(patch.rollback.supported);
    }

    #[test]
    fn test_apply_patch_without_build_or_file() {
        let mut h = Harness::new(Env::Dev);
        let outcome = h.run(ActionKind::ApplyPatch);
        assert_eq!(outcome.state, StepState::Success);
        assert!(h.outputs.build.is_none());
        assert!(h.outputs.patch.as_ref().unwrap().files[0].before_sha256.is_none());
    }
}
