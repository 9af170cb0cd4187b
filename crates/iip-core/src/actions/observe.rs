//! Observe agent: evidence collection after a deploy.

use super::{ActionContext, ActionOutcome};
use crate::{mock_data, session::OutputUpdate};

/// Gather evidence about the latest release. A checklist alone is enough of
/// a deploy report to collect against.
pub(super) fn collect_evidence(ctx: &ActionContext<'_>) -> ActionOutcome {
    let Some(deploy) = &ctx.outputs.deploy else {
        return ActionOutcome::failed("No deploy report. Run Deploy first.");
    };

    let release = deploy.release.as_ref();
    let pack = mock_data::evidence_pack(
        ctx.env,
        release.map(|r| r.release_id.clone()),
        release.and_then(|r| r.error.as_ref()).map(|e| e.message.as_str()),
        ctx.now,
    );

    ActionOutcome::success(
        "Evidence collected (logs/metrics/traces) and summarized.",
        vec![OutputUpdate::Evidence(pack)],
    )
}
