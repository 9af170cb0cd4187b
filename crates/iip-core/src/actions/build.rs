//! Build agent: Mule app skeleton and DataWeave generation.

use super::{ActionContext, ActionOutcome};
use crate::{mock_data, session::OutputUpdate};

/// Generate the Mule flow, DataWeave script and properties together.
///
/// Both Build actions land here; the three artifacts are produced as a set.
pub(super) fn generate_mule_app(ctx: &ActionContext<'_>) -> ActionOutcome {
    if ctx.outputs.intent.is_none() || ctx.outputs.api_spec.is_none() {
        return ActionOutcome::failed("Missing Intent or OAS. Run Intent → Design first.");
    }

    ActionOutcome::success(
        "Mule flow + DataWeave + properties generated (demo) and stored in session output.",
        vec![OutputUpdate::Build(mock_data::build_artifacts())],
    )
}
