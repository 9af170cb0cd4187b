//! The fixed seven-step session graph.
//!
//! Ids are freshly generated on every call; everything else is determined
//! by the environment tier.

use serde_json::json;

use iip_contracts::pipeline::{ActionItem, AgentType, Env, Risk, Step, StepId, StepName, StepState};

/// Build the session pipeline for `env`.
///
/// Production raises "Run API Tests" to `High` risk and marks the gated test
/// and deploy payloads with `requireSecondConfirm`.
pub fn create_session_graph(env: Env) -> Vec<Step> {
    let prd = env.is_production();
    let e = env.as_str();

    vec![
        step(
            StepName::Intent,
            AgentType::Intent,
            "Compile natural language requirements into structured intent and constraints.",
            vec![
                ActionItem::automated(
                    Risk::Low,
                    &["FR-003"],
                    "Compile Intent",
                    "Parse requirement into intent + plan outline.",
                    "/api/actions/intent/compile",
                    json!({ "env": e }),
                ),
                ActionItem::consultative(
                    Risk::Low,
                    &["FR-006"],
                    "Show Assumptions",
                    "Explain assumptions and missing inputs.",
                ),
            ],
        ),
        step(
            StepName::Design,
            AgentType::Design,
            "Generate/update API Spec (OAS/RAML) and apply org guardrails.",
            vec![
                ActionItem::gated(
                    Risk::High,
                    &["FR-101", "FR-103"],
                    "Generate/Update API Spec",
                    "Create or update OAS/RAML. Requires approval.",
                    "/api/actions/design/spec-generate",
                    json!({ "specType": "OAS", "env": e }),
                ),
                ActionItem::consultative(
                    Risk::Low,
                    &["FR-102"],
                    "Spec Quality Review",
                    "Suggest improvements: naming, schema, error model.",
                ),
            ],
        ),
        step(
            StepName::Build,
            AgentType::Dev,
            "Generate Mule app skeleton and DataWeave transforms.",
            vec![
                ActionItem::gated(
                    Risk::High,
                    &["FR-201"],
                    "Generate Mule App",
                    "Create flows/connectors/config placeholders. Requires approval.",
                    "/api/actions/dev/generate-app",
                    json!({ "env": e }),
                ),
                ActionItem::gated(
                    Risk::High,
                    &["FR-205"],
                    "Generate DataWeave",
                    "Create DW scripts and validate with sample input. Requires approval.",
                    "/api/actions/dev/dataweave",
                    json!({ "env": e }),
                ),
                ActionItem::consultative(
                    Risk::Low,
                    &["FR-204"],
                    "Codebase Q&A",
                    "Explain flow/data mapping and risks.",
                ),
            ],
        ),
        step(
            StepName::Test,
            AgentType::Test,
            "Generate/run API tests and E2E workflow tests, auto-judge results.",
            vec![
                ActionItem::automated(
                    Risk::Medium,
                    &["FR-601"],
                    "Generate API Test Cases",
                    "Generate normal/boundary/error/auth/smoke tests.",
                    "/api/actions/test/api-generate",
                    json!({ "env": e }),
                ),
                ActionItem::gated(
                    if prd { Risk::High } else { Risk::Medium },
                    &["FR-602"],
                    "Run API Tests",
                    "Execute tests with auth template. Requires approval.",
                    "/api/actions/test/api-run",
                    json!({ "env": e, "requireSecondConfirm": prd }),
                ),
                ActionItem::automated(
                    Risk::Medium,
                    &["FR-603"],
                    "Auto-Judge",
                    "Validate status/schema/field rules and compute pass/fail.",
                    "/api/actions/test/auto-judge",
                    json!({ "env": e }),
                ),
            ],
        ),
        step(
            StepName::Deploy,
            AgentType::Deploy,
            "Deploy to environment and record release history.",
            vec![
                ActionItem::consultative(
                    Risk::Low,
                    &["FR-303"],
                    "Pre-deploy Checklist",
                    "Check env vars/policies/permissions and warn risks.",
                ),
                ActionItem::gated(
                    Risk::High,
                    &["FR-301"],
                    "Deploy Instance",
                    "Deploy to selected env. Requires approval.",
                    "/api/actions/deploy/deploy",
                    json!({ "env": e, "requireSecondConfirm": prd }),
                ),
            ],
        ),
        step(
            StepName::Observe,
            AgentType::Orchestrator,
            "Collect logs/metrics/traces and summarize evidence.",
            vec![
                ActionItem::automated(
                    Risk::Low,
                    &["FR-404"],
                    "Collect Evidence",
                    "Gather logs/metrics/traces for evidence-based summary.",
                    "/api/actions/observe/collect",
                    json!({ "env": e }),
                ),
                ActionItem::consultative(
                    Risk::Low,
                    &["FR-401"],
                    "Troubleshooting Summary",
                    "Classify cause candidates and propose actions.",
                ),
            ],
        ),
        step(
            StepName::Debug,
            AgentType::Debug,
            "Drill down step traces, localize root cause, propose patch diff and apply with approval.",
            vec![
                ActionItem::automated(
                    Risk::Medium,
                    &["FR-621"],
                    "Trace Drilldown",
                    "Show step-level IO + connector req/resp + latency.",
                    "/api/actions/debug/trace",
                    json!({ "env": e }),
                ),
                ActionItem::automated(
                    Risk::Medium,
                    &["FR-623"],
                    "Root Cause Localization",
                    "Localize failure to step/config/data/auth/network.",
                    "/api/actions/debug/rcl",
                    json!({ "env": e }),
                ),
                ActionItem::gated(
                    Risk::High,
                    &["FR-624"],
                    "Apply Patch (Commit)",
                    "Apply safe patch (DW/config) with rollback option. Requires approval.",
                    "/api/actions/debug/apply-patch",
                    json!({ "env": e, "rollbackEnabled": true }),
                ),
            ],
        ),
    ]
}

fn step(name: StepName, agent: AgentType, description: &str, actions: Vec<ActionItem>) -> Step {
    Step {
        id: StepId::new(),
        name,
        state: StepState::Pending,
        agent,
        description: description.to_string(),
        actions,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
