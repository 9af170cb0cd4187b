//! Deploy agent: pre-deploy checklist and release recording.

use tracing::warn;

use iip_contracts::pipeline::StepState;

use super::{ActionContext, ActionOutcome};
use crate::{mock_data, session::OutputUpdate};

pub(super) fn predeploy_checklist(ctx: &ActionContext<'_>) -> ActionOutcome {
    ActionOutcome::success(
        "Pre-deploy checklist complete (demo).",
        vec![OutputUpdate::Checklist(mock_data::predeploy_checklist(ctx.env))],
    )
}

/// Record a release. Fails with the seeded config error unless the console
/// was configured otherwise.
pub(super) fn deploy_instance(ctx: &ActionContext<'_>) -> ActionOutcome {
    let release_id = format!("rel-{}", ctx.now.timestamp_millis());

    if ctx.simulate_deploy_failure {
        let release = mock_data::failed_release(ctx.env, release_id, ctx.now);
        let reason = release
            .error
            .as_ref()
            .map_or("Unknown error", |e| e.message.as_str())
            .to_string();
        warn!(release_id = %release.release_id, env = %ctx.env, "deploy failed");

        return ActionOutcome {
            state: StepState::Failed,
            message: format!("Deploy failed: {reason}"),
            updates: vec![OutputUpdate::Release(release)],
        };
    }

    let release = mock_data::successful_release(ctx.env, release_id, ctx.now);
    ActionOutcome::success(
        format!("Deploy success: {}", release.release_id),
        vec![OutputUpdate::Release(release)],
    )
}
