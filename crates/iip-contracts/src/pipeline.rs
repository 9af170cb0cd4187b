//! Pipeline graph types: steps, actions, and the action catalogue.
//!
//! A session owns a fixed, linear sequence of seven steps. Each step carries
//! an ordered list of actions the operator can trigger. Nothing in this
//! module executes anything; it only describes the graph.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Deployment tier the console session targets.
///
/// `Prd` is the only tier that changes behavior: the approval gate demands a
/// second confirmation and some actions are rated at a higher risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Env {
    #[default]
    #[serde(rename = "DEV")]
    Dev,
    #[serde(rename = "STG")]
    Stg,
    #[serde(rename = "PRD")]
    Prd,
}

impl Env {
    /// True for the production tier.
    pub fn is_production(self) -> bool {
        matches!(self, Env::Prd)
    }

    /// The wire label (`DEV`, `STG`, `PRD`).
    pub fn as_str(self) -> &'static str {
        match self {
            Env::Dev => "DEV",
            Env::Stg => "STG",
            Env::Prd => "PRD",
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Env {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEV" => Ok(Env::Dev),
            "STG" => Ok(Env::Stg),
            "PRD" => Ok(Env::Prd),
            other => Err(format!("unknown environment '{other}' (expected DEV, STG or PRD)")),
        }
    }
}

/// The seven fixed pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StepName {
    Intent,
    Design,
    Build,
    Test,
    Deploy,
    Observe,
    Debug,
}

impl StepName {
    /// All steps in pipeline order.
    pub const ALL: [StepName; 7] = [
        StepName::Intent,
        StepName::Design,
        StepName::Build,
        StepName::Test,
        StepName::Deploy,
        StepName::Observe,
        StepName::Debug,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StepName::Intent => "Intent",
            StepName::Design => "Design",
            StepName::Build => "Build",
            StepName::Test => "Test",
            StepName::Deploy => "Deploy",
            StepName::Observe => "Observe",
            StepName::Debug => "Debug",
        }
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a step.
///
/// `Pending → Running → {Success, Failed}`. `Skipped` is only ever assigned
/// from outside; no action produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StepState {
    #[default]
    Pending,
    Running,
    Success,
    Failed,
    Skipped,
}

impl StepState {
    /// True once a step has settled into a state no action will leave on its own.
    pub fn is_settled(self) -> bool {
        matches!(self, StepState::Success | StepState::Failed | StepState::Skipped)
    }
}

/// The agent label that owns a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentType {
    Orchestrator,
    Intent,
    Design,
    Dev,
    Test,
    Deploy,
    Debug,
}

/// Operator-facing risk rating of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Risk {
    Low,
    Medium,
    High,
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Risk::Low => "Low",
            Risk::Medium => "Medium",
            Risk::High => "High",
        };
        f.write_str(s)
    }
}

/// Capability tags shown as `[A]`, `[C]` and `[H]` in the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ActionTags {
    /// `[A]`: the agent can run this without a human in the loop.
    pub automated: bool,
    /// `[C]`: advisory output only.
    pub consultative: bool,
    /// `[H]`: a human must approve before execution.
    pub human_approval: bool,
}

/// Unique identifier of a step within one session graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(pub uuid::Uuid);

impl StepId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for StepId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier of an action within one session graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub uuid::Uuid);

impl ActionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single invocable operation within a step.
///
/// Actions are immutable once the graph is built. The only derived copy is
/// the one produced by [`ActionItem::without_approval`], which the console
/// executes after the approval gate has been passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub id: ActionId,
    pub name: String,
    pub description: String,
    pub tags: ActionTags,
    pub risk: Risk,
    /// Always equal to `tags.human_approval` for graph-built actions.
    pub requires_approval: bool,
    /// Functional-requirement references (e.g. "FR-003").
    pub fr_refs: Vec<String>,
    /// Mock endpoint label. Never called.
    pub api_endpoint: String,
    /// Opaque template data. Never executed.
    pub payload_template: serde_json::Value,
}

impl ActionItem {
    /// An `[A]` action: runs directly.
    pub fn automated(
        risk: Risk,
        fr_refs: &[&str],
        name: impl Into<String>,
        description: impl Into<String>,
        api_endpoint: impl Into<String>,
        payload_template: serde_json::Value,
    ) -> Self {
        Self {
            id: ActionId::new(),
            name: name.into(),
            description: description.into(),
            tags: ActionTags { automated: true, consultative: false, human_approval: false },
            risk,
            requires_approval: false,
            fr_refs: fr_refs.iter().map(|r| r.to_string()).collect(),
            api_endpoint: api_endpoint.into(),
            payload_template,
        }
    }

    /// A `[C]` action: advisory, no endpoint and no payload.
    pub fn consultative(
        risk: Risk,
        fr_refs: &[&str],
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: ActionId::new(),
            name: name.into(),
            description: description.into(),
            tags: ActionTags { automated: false, consultative: true, human_approval: false },
            risk,
            requires_approval: false,
            fr_refs: fr_refs.iter().map(|r| r.to_string()).collect(),
            api_endpoint: String::new(),
            payload_template: serde_json::Value::Null,
        }
    }

    /// An `[A][H]` action: automated, but always routed through the approval gate.
    pub fn gated(
        risk: Risk,
        fr_refs: &[&str],
        name: impl Into<String>,
        description: impl Into<String>,
        api_endpoint: impl Into<String>,
        payload_template: serde_json::Value,
    ) -> Self {
        Self {
            tags: ActionTags { automated: true, consultative: false, human_approval: true },
            requires_approval: true,
            ..Self::automated(risk, fr_refs, name, description, api_endpoint, payload_template)
        }
    }

    /// The copy executed once approval has been granted.
    ///
    /// Clearing the flag is what keeps an approved action from being
    /// deferred to the gate a second time.
    pub fn without_approval(&self) -> Self {
        Self { requires_approval: false, ..self.clone() }
    }
}

/// One stage of the session pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub name: StepName,
    /// Current lifecycle state. Only the session reducer changes it.
    pub state: StepState,
    pub agent: AgentType,
    pub description: String,
    pub actions: Vec<ActionItem>,
}

impl Step {
    /// Find an action by id.
    pub fn action(&self, id: ActionId) -> Option<&ActionItem> {
        self.actions.iter().find(|a| a.id == id)
    }

    /// Find an action by display name.
    pub fn action_named(&self, name: &str) -> Option<&ActionItem> {
        self.actions.iter().find(|a| a.name == name)
    }
}

/// Every (step, action) pair the console knows how to run.
///
/// Dispatch goes through this enum rather than through string comparison so
/// that adding a variant without wiring a handler is a compile error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    CompileIntent,
    ShowAssumptions,
    GenerateApiSpec,
    SpecQualityReview,
    GenerateMuleApp,
    GenerateDataWeave,
    CodebaseQa,
    GenerateApiTestCases,
    RunApiTests,
    AutoJudge,
    PredeployChecklist,
    DeployInstance,
    CollectEvidence,
    TroubleshootingSummary,
    TraceDrilldown,
    RootCauseLocalization,
    ApplyPatch,
}

impl ActionKind {
    pub const ALL: [ActionKind; 17] = [
        ActionKind::CompileIntent,
        ActionKind::ShowAssumptions,
        ActionKind::GenerateApiSpec,
        ActionKind::SpecQualityReview,
        ActionKind::GenerateMuleApp,
        ActionKind::GenerateDataWeave,
        ActionKind::CodebaseQa,
        ActionKind::GenerateApiTestCases,
        ActionKind::RunApiTests,
        ActionKind::AutoJudge,
        ActionKind::PredeployChecklist,
        ActionKind::DeployInstance,
        ActionKind::CollectEvidence,
        ActionKind::TroubleshootingSummary,
        ActionKind::TraceDrilldown,
        ActionKind::RootCauseLocalization,
        ActionKind::ApplyPatch,
    ];

    /// The step this action belongs to.
    pub fn step(self) -> StepName {
        use ActionKind as K;
        match self {
            K::CompileIntent | K::ShowAssumptions => StepName::Intent,
            K::GenerateApiSpec | K::SpecQualityReview => StepName::Design,
            K::GenerateMuleApp | K::GenerateDataWeave | K::CodebaseQa => StepName::Build,
            K::GenerateApiTestCases | K::RunApiTests | K::AutoJudge => StepName::Test,
            K::PredeployChecklist | K::DeployInstance => StepName::Deploy,
            K::CollectEvidence | K::TroubleshootingSummary => StepName::Observe,
            K::TraceDrilldown | K::RootCauseLocalization | K::ApplyPatch => StepName::Debug,
        }
    }

    /// Display name, exactly as it appears in the session graph.
    pub fn name(self) -> &'static str {
        use ActionKind as K;
        match self {
            K::CompileIntent => "Compile Intent",
            K::ShowAssumptions => "Show Assumptions",
            K::GenerateApiSpec => "Generate/Update API Spec",
            K::SpecQualityReview => "Spec Quality Review",
            K::GenerateMuleApp => "Generate Mule App",
            K::GenerateDataWeave => "Generate DataWeave",
            K::CodebaseQa => "Codebase Q&A",
            K::GenerateApiTestCases => "Generate API Test Cases",
            K::RunApiTests => "Run API Tests",
            K::AutoJudge => "Auto-Judge",
            K::PredeployChecklist => "Pre-deploy Checklist",
            K::DeployInstance => "Deploy Instance",
            K::CollectEvidence => "Collect Evidence",
            K::TroubleshootingSummary => "Troubleshooting Summary",
            K::TraceDrilldown => "Trace Drilldown",
            K::RootCauseLocalization => "Root Cause Localization",
            K::ApplyPatch => "Apply Patch (Commit)",
        }
    }

    /// Resolve a (step, action name) pair. Both must match.
    pub fn resolve(step: StepName, name: &str) -> Option<ActionKind> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.step() == step && kind.name() == name)
    }

    /// How long the mock agent pretends to work before resolving.
    pub fn simulated_delay(self) -> Duration {
        use ActionKind as K;
        let millis = match self {
            K::CompileIntent => 400,
            K::GenerateApiSpec => 500,
            K::GenerateMuleApp | K::GenerateDataWeave => 600,
            K::GenerateApiTestCases => 500,
            K::RunApiTests => 700,
            K::AutoJudge => 400,
            K::PredeployChecklist => 400,
            K::DeployInstance => 800,
            K::CollectEvidence => 600,
            K::TraceDrilldown => 400,
            K::RootCauseLocalization => 450,
            K::ApplyPatch => 600,
            K::ShowAssumptions
            | K::SpecQualityReview
            | K::CodebaseQa
            | K::TroubleshootingSummary => return FALLBACK_DELAY,
        };
        Duration::from_millis(millis)
    }
}

/// Delay used by the fallback handler for actions without a dedicated mock.
pub const FALLBACK_DELAY: Duration = Duration::from_millis(300);
