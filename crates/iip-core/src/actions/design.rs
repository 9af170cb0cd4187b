//! Design agent: OpenAPI document from the compiled intent.

use super::{ActionContext, ActionOutcome};
use crate::{mock_data, session::OutputUpdate};

/// Generate the OpenAPI document. Needs a compiled intent.
pub(super) fn generate_api_spec(ctx: &ActionContext<'_>) -> ActionOutcome {
    let Some(intent) = &ctx.outputs.intent else {
        return ActionOutcome::failed("No Intent Output. Run 'Compile Intent' first.");
    };

    ActionOutcome::success(
        "OAS generated from Intent and stored in session output.",
        vec![OutputUpdate::ApiSpec(mock_data::account_inquiry_oas(intent))],
    )
}
