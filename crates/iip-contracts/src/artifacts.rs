//! Step output artifacts.
//!
//! Each artifact is produced by exactly one action and stored in the session
//! until a later action overwrites it. Downstream actions check for their
//! presence as preconditions. The OpenAPI document itself is kept as raw
//! JSON since it is not a type this crate owns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::judge::{JudgeReport, ObservedCase, TestCase};
use crate::pipeline::Env;

// ── Intent ───────────────────────────────────────────────────────────────────

/// Structured intent compiled from the free-text requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentSummary {
    pub requirement: String,
    pub constraints: IntentConstraints,
    pub derived: DerivedDesign,
    pub plan: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentConstraints {
    pub env: Env,
    pub approval_model: String,
    pub secrets: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedDesign {
    pub api_style: String,
    pub resources: Vec<String>,
    pub legacy_targets: Vec<String>,
    pub transformations: Vec<String>,
    pub tests: Vec<String>,
    pub deploy: Vec<String>,
}

// ── Build ────────────────────────────────────────────────────────────────────

/// Workspace path of the generated Mule application descriptor.
pub const MULE_APP_PATH: &str = "artifacts/mule/mule-app.xml";
/// Workspace path of the generated DataWeave script.
pub const DATAWEAVE_PATH: &str = "artifacts/mule/account-inquiry.dwl";
/// Workspace path of the generated configuration properties.
pub const PROPERTIES_PATH: &str = "artifacts/mule/config.properties";

/// Generated Mule flow, DataWeave transform and configuration text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildArtifacts {
    pub mule_xml: String,
    pub data_weave: String,
    pub properties: String,
}

impl BuildArtifacts {
    /// The files this build writes, as `(workspace path, content)` in write order.
    pub fn targets(&self) -> [(&'static str, &str); 3] {
        [
            (MULE_APP_PATH, self.mule_xml.as_str()),
            (DATAWEAVE_PATH, self.data_weave.as_str()),
            (PROPERTIES_PATH, self.properties.as_str()),
        ]
    }
}

// ── Test ─────────────────────────────────────────────────────────────────────

/// The generated API test suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSuite {
    pub generated_from: String,
    pub endpoint_under_test: String,
    pub cases: Vec<TestCase>,
}

/// Raw results of a test run, not yet judged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub executed_at: DateTime<Utc>,
    pub total: usize,
    pub results: Vec<ObservedCase>,
}

/// The test report slot holds either raw execution output or a judged report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase")]
pub enum TestReport {
    #[serde(rename = "EXECUTED")]
    Executed(ExecutionReport),
    #[serde(rename = "JUDGED")]
    Judged(JudgeReport),
}

impl TestReport {
    /// The observed results, whichever phase the report is in.
    pub fn observed(&self) -> Vec<ObservedCase> {
        match self {
            TestReport::Executed(report) => report.results.clone(),
            TestReport::Judged(report) => report.results.iter().map(|r| r.case.clone()).collect(),
        }
    }

    pub fn judged(&self) -> Option<&JudgeReport> {
        match self {
            TestReport::Judged(report) => Some(report),
            TestReport::Executed(_) => None,
        }
    }
}

// ── Deploy ───────────────────────────────────────────────────────────────────

/// Deploy step output: the pre-deploy checklist and the latest release.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeployReport {
    pub checklist: Option<Checklist>,
    pub release: Option<Release>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checklist {
    pub env: Env,
    pub checks: Vec<ChecklistItem>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub name: String,
    pub ok: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReleaseStatus {
    Success,
    Failed,
}

/// One deployment attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub env: Env,
    pub status: ReleaseStatus,
    pub release_id: String,
    pub deploy_target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<DeployError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs_ref: Option<String>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployError {
    pub category: String,
    pub message: String,
}

// ── Observe ──────────────────────────────────────────────────────────────────

/// Logs, metrics and traces gathered after a deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidencePack {
    pub env: Env,
    pub release_id: Option<String>,
    pub collected_at: DateTime<Utc>,
    pub signals: Signals,
    pub evidence_summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    pub logs: Vec<LogLine>,
    pub metrics: Vec<Metric>,
    pub traces: Vec<TraceSignal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub ts: DateTime<Utc>,
    pub level: String,
    pub msg: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceSignal {
    pub span: String,
    pub status: String,
    pub evidence: String,
}

// ── Debug ────────────────────────────────────────────────────────────────────

/// Debug step output. Trace drilldown and root-cause localization fill
/// separate halves and never clear each other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugReport {
    pub trace: Option<TraceDrilldown>,
    pub root_cause: Option<RootCauseReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceDrilldown {
    pub release_id: Option<String>,
    pub steps: Vec<TraceStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceStep {
    pub step: String,
    pub ok: bool,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootCauseReport {
    pub classification: String,
    pub confidence: f64,
    pub candidates: Vec<CauseCandidate>,
    pub recommended_fix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CauseCandidate {
    pub cause: String,
    pub confidence: f64,
}

/// A proposed (and, once approved, applied) configuration patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchProposal {
    pub files: Vec<PatchFile>,
    pub rollback: Rollback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchFile {
    pub file_path: String,
    pub diff: String,
    /// SHA-256 of the file before patching; `None` when it did not exist.
    pub before_sha256: Option<String>,
    pub after_sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rollback {
    pub supported: bool,
    pub note: String,
}

// ── Workspace previews ───────────────────────────────────────────────────────

/// Diff of one build artifact against what is currently in the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactPreview {
    pub path: String,
    /// True when the workspace already holds exactly this content.
    pub unchanged: bool,
    pub current_sha256: Option<String>,
    pub proposed_sha256: String,
    /// Positional line diff in `"  "`/`"- "`/`"+ "` form.
    pub diff: String,
}
