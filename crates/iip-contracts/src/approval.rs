//! Approval request and confirmation types.

use serde::{Deserialize, Serialize};

use crate::pipeline::{ActionItem, Risk, StepId, StepName};

/// Action name shown for the artifact-save approval.
pub const SAVE_ARTIFACTS_ACTION: &str = "Write Build Artifacts to Workspace";

/// An operation waiting behind the approval gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ApprovalRequest {
    /// Write the generated build artifacts into the workspace.
    #[serde(rename_all = "camelCase")]
    SaveArtifacts { action_name: String, risk: Risk },

    /// Execute a specific `[H]` action.
    #[serde(rename_all = "camelCase")]
    Action {
        step_id: StepId,
        step_name: StepName,
        action: ActionItem,
    },
}

impl ApprovalRequest {
    /// The default save request.
    pub fn save_artifacts() -> Self {
        ApprovalRequest::SaveArtifacts {
            action_name: SAVE_ARTIFACTS_ACTION.to_string(),
            risk: Risk::High,
        }
    }

    /// Name shown to the approver.
    pub fn action_name(&self) -> &str {
        match self {
            ApprovalRequest::SaveArtifacts { action_name, .. } => action_name,
            ApprovalRequest::Action { action, .. } => &action.name,
        }
    }

    /// Risk shown to the approver.
    pub fn risk(&self) -> Risk {
        match self {
            ApprovalRequest::SaveArtifacts { risk, .. } => *risk,
            ApprovalRequest::Action { action, .. } => action.risk,
        }
    }
}

/// What the operator entered in the approval dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    /// Free text; must equal the confirmation phrase exactly.
    pub typed: String,
    /// The production-only second checkbox.
    #[serde(default)]
    pub second_confirmation: bool,
}

impl Confirmation {
    pub fn new(typed: impl Into<String>, second_confirmation: bool) -> Self {
        Self { typed: typed.into(), second_confirmation }
    }
}
