//! Scenario 1: Happy Path
//!
//! Walks the pipeline from the free-text requirement to the pre-deploy
//! checklist:
//!   1. Intent is compiled, then the gated Design and Build actions run
//!      after scripted approval
//!   2. The generated artifacts are diffed against the workspace, then
//!      written behind a second approval
//!   3. Test cases are generated, executed and auto-judged; the seeded
//!      missing `status` field on API-001 fails the judge at 75%
//!   4. The pre-deploy checklist runs

use tracing::info;

use iip_contracts::{error::ConsoleResult, pipeline::StepName};
use iip_core::Console;

use super::{confirmation_for, print_audit_tail, print_dispatch, run_approved, Rig};

/// Run Scenario 1 and return the console in its final state.
pub fn run_scenario(rig: &Rig) -> ConsoleResult<Console> {
    println!("=== Scenario 1: Happy Path ===");
    println!();

    let mut console = rig.console()?;
    info!(env = %console.env(), "happy path scenario started");

    println!("  Env:         {}", console.env());
    println!("  Requirement: {}", console.state().requirement);
    println!();

    // ── Intent → Design → Build ───────────────────────────────────────────────

    run_approved(&mut console, StepName::Intent, "Compile Intent")?;
    run_approved(&mut console, StepName::Intent, "Show Assumptions")?;
    run_approved(&mut console, StepName::Design, "Generate/Update API Spec")?;
    run_approved(&mut console, StepName::Build, "Generate Mule App")?;
    println!();

    // ── Preview and save artifacts ────────────────────────────────────────────

    for preview in console.preview_build_artifacts()? {
        let lines = preview.diff.lines().count();
        let status = if preview.unchanged { "unchanged" } else { "changed" };
        println!("  [diff]  {:<40} {:<9} ({} line(s))", preview.path, status, lines);
    }

    console.request_save_artifacts()?;
    println!("  [gate]  Write Build Artifacts to Workspace awaiting approval");
    let saved = console.approve(&confirmation_for(&console))?.settled()?;
    print_dispatch("Build", "Write artifacts", &saved);
    println!();

    // ── Test cycle ────────────────────────────────────────────────────────────

    run_approved(&mut console, StepName::Test, "Generate API Test Cases")?;
    run_approved(&mut console, StepName::Test, "Run API Tests")?;
    run_approved(&mut console, StepName::Test, "Auto-Judge")?;

    if let Some(report) = console.state().outputs.test_report.as_ref().and_then(|r| r.judged()) {
        let summary = report.summary;
        println!(
            "  Judge:   {}/{} passed ({}%), rules: {}",
            summary.passed,
            summary.total,
            summary.pass_rate,
            report.rules.join(", ")
        );
        for case in report.results.iter().filter(|c| !c.passed) {
            println!(
                "    FAIL {} {}: {}",
                case.case.id,
                case.case.title,
                case.root_cause_hint.as_deref().unwrap_or("no hint")
            );
        }
    }
    println!();

    // ── Deploy readiness ──────────────────────────────────────────────────────

    run_approved(&mut console, StepName::Deploy, "Pre-deploy Checklist")?;
    println!();

    print_audit_tail(&console, 5);
    println!();
    println!("  Scenario 1 complete.");
    println!();

    Ok(console)
}
