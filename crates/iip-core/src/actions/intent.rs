//! Intent agent.

use tracing::debug;

use super::{ActionContext, ActionOutcome};
use crate::{mock_data, session::OutputUpdate};

/// Turn the requirement text into a structured intent. No preconditions.
pub(super) fn compile_intent(ctx: &ActionContext<'_>) -> ActionOutcome {
    let intent = mock_data::intent_summary(ctx.requirement, ctx.env);
    debug!(plan_items = intent.plan.len(), "intent compiled");

    ActionOutcome::success(
        "Intent compiled and stored in session output.",
        vec![OutputUpdate::Intent(intent)],
    )
}
