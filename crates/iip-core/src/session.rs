//! Session state and its reducer.
//!
//! `SessionState` is the whole observable state of one console session:
//! the step graph with live step states, the requirement text, every step
//! output, the audit trail and the last artifact preview. It changes only
//! through [`SessionState::apply`], one `SessionEvent` at a time.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use iip_audit::AuditTrail;
use iip_contracts::{
    artifacts::{
        ArtifactPreview, BuildArtifacts, Checklist, DebugReport, DeployReport, EvidencePack,
        IntentSummary, PatchProposal, Release, RootCauseReport, TestReport, TestSuite,
        TraceDrilldown,
    },
    audit::AuditEntry,
    pipeline::{Env, Step, StepId, StepName, StepState},
};

use crate::graph::create_session_graph;

// ── Outputs ───────────────────────────────────────────────────────────────────

/// Output slots, one per artifact kind. `None` until an action fills it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOutputs {
    pub intent: Option<IntentSummary>,
    /// OpenAPI document.
    pub api_spec: Option<Value>,
    pub build: Option<BuildArtifacts>,
    pub test_suite: Option<TestSuite>,
    pub test_report: Option<TestReport>,
    pub deploy: Option<DeployReport>,
    pub evidence: Option<EvidencePack>,
    pub debug: Option<DebugReport>,
    pub patch: Option<PatchProposal>,
}

/// A write into one output slot.
///
/// Deploy and debug reports are assembled from halves; storing one half
/// keeps the other.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputUpdate {
    Intent(IntentSummary),
    ApiSpec(Value),
    Build(BuildArtifacts),
    /// Replace the properties text of existing build output. No-op without one.
    BuildProperties(String),
    TestSuite(TestSuite),
    TestReport(TestReport),
    Checklist(Checklist),
    Release(Release),
    Evidence(EvidencePack),
    Trace(TraceDrilldown),
    RootCause(RootCauseReport),
    Patch(PatchProposal),
}

impl SessionOutputs {
    pub(crate) fn store(&mut self, update: OutputUpdate) {
        match update {
            OutputUpdate::Intent(v) => self.intent = Some(v),
            OutputUpdate::ApiSpec(v) => self.api_spec = Some(v),
            OutputUpdate::Build(v) => self.build = Some(v),
            OutputUpdate::BuildProperties(text) => {
                if let Some(build) = self.build.as_mut() {
                    build.properties = text;
                }
            }
            OutputUpdate::TestSuite(v) => self.test_suite = Some(v),
            OutputUpdate::TestReport(v) => self.test_report = Some(v),
            OutputUpdate::Checklist(v) => self.deploy.get_or_insert_with(Default::default).checklist = Some(v),
            OutputUpdate::Release(v) => self.deploy.get_or_insert_with(Default::default).release = Some(v),
            OutputUpdate::Evidence(v) => self.evidence = Some(v),
            OutputUpdate::Trace(v) => self.debug.get_or_insert_with(Default::default).trace = Some(v),
            OutputUpdate::RootCause(v) => self.debug.get_or_insert_with(Default::default).root_cause = Some(v),
            OutputUpdate::Patch(v) => self.patch = Some(v),
        }
    }
}

// ── Events ────────────────────────────────────────────────────────────────────

/// Everything that can happen to a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StepStateChanged { step_id: StepId, state: StepState },
    OutputStored(OutputUpdate),
    AuditAppended(AuditEntry),
    RequirementChanged(String),
    DiffsPreviewed(Vec<ArtifactPreview>),
}

// ── State ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub env: Env,
    pub requirement: String,
    pub steps: Vec<Step>,
    pub outputs: SessionOutputs,
    pub audit: AuditTrail,
    pub diffs: Vec<ArtifactPreview>,
}

impl SessionState {
    /// A fresh session over a newly generated graph.
    pub fn new(env: Env, requirement: impl Into<String>) -> Self {
        Self {
            env,
            requirement: requirement.into(),
            steps: create_session_graph(env),
            outputs: SessionOutputs::default(),
            audit: AuditTrail::new(),
            diffs: Vec::new(),
        }
    }

    /// The reducer.
    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::StepStateChanged { step_id, state } => {
                match self.steps.iter_mut().find(|s| s.id == step_id) {
                    Some(step) => {
                        debug!(step = %step.name, from = ?step.state, to = ?state, "step state changed");
                        step.state = state;
                    }
                    None => warn!(step_id = %step_id, "state change for unknown step ignored"),
                }
            }
            SessionEvent::OutputStored(update) => self.outputs.store(update),
            SessionEvent::AuditAppended(entry) => self.audit.append(entry),
            SessionEvent::RequirementChanged(text) => self.requirement = text,
            SessionEvent::DiffsPreviewed(previews) => self.diffs = previews,
        }
    }

    pub fn step(&self, step_id: StepId) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    pub fn step_named(&self, name: StepName) -> Option<&Step> {
        self.steps.iter().find(|s| s.name == name)
    }

    pub fn step_state(&self, step_id: StepId) -> Option<StepState> {
        self.step(step_id).map(|s| s.state)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
