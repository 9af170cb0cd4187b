//! Debug agent: trace drilldown, root-cause localization and the config patch.

use tracing::{info, warn};

use iip_contracts::{
    artifacts::{PatchProposal, PROPERTIES_PATH},
    pipeline::StepState,
};
use iip_judge::diff::simple_line_diff;

use super::{ActionContext, ActionOutcome};
use crate::{mock_data, session::OutputUpdate, workspace::digest};

pub(super) fn trace_drilldown(ctx: &ActionContext<'_>) -> ActionOutcome {
    let Some(evidence) = &ctx.outputs.evidence else {
        return ActionOutcome::failed("No evidence pack. Run Observe → Collect Evidence first.");
    };

    ActionOutcome::success(
        "Trace drilldown ready (demo).",
        vec![OutputUpdate::Trace(mock_data::trace_drilldown(evidence.release_id.clone()))],
    )
}

pub(super) fn root_cause_localization(ctx: &ActionContext<'_>) -> ActionOutcome {
    if ctx.outputs.evidence.is_none() {
        return ActionOutcome::failed("No evidence pack.");
    }

    ActionOutcome::success(
        "Root cause localized with candidate list and recommended fix.",
        vec![OutputUpdate::RootCause(mock_data::root_cause_report())],
    )
}

/// Write the patched `config.properties` into the workspace.
///
/// No preconditions. The proposal is stored even when the write fails; the
/// build output is only updated once the file is on disk.
pub(super) fn apply_patch(ctx: &ActionContext<'_>) -> ActionOutcome {
    let patched = mock_data::PATCHED_PROPERTIES;
    let current = ctx.workspace.read(PROPERTIES_PATH).unwrap_or_default();
    let before = current.exists.then(|| digest(&current.content));

    let proposal = PatchProposal {
        files: vec![mock_data::patch_file(
            simple_line_diff(&current.content, patched),
            before,
            digest(patched),
        )],
        rollback: mock_data::patch_rollback(),
    };

    match ctx.workspace.write(PROPERTIES_PATH, patched) {
        Ok(()) => {
            info!(path = PROPERTIES_PATH, "config patch applied");
            ActionOutcome::success(
                format!("Patch applied to {PROPERTIES_PATH} (approved)."),
                vec![
                    OutputUpdate::Patch(proposal),
                    OutputUpdate::BuildProperties(patched.to_string()),
                ],
            )
        }
        Err(e) => {
            warn!(path = PROPERTIES_PATH, error = %e, "config patch failed");
            ActionOutcome {
                state: StepState::Failed,
                message: e.to_string(),
                updates: vec![OutputUpdate::Patch(proposal)],
            }
        }
    }
}
