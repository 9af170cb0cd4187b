//! Scenario 3: Guardrails
//!
//! Exercises every refusal the console gives, in PRD so the second
//! confirmation applies:
//!   - a gated action waits at the gate instead of running
//!   - dispatch is suspended while a request is pending
//!   - a mistyped phrase and a missing second confirmation are rejected
//!   - cancelling runs nothing and audits nothing
//!   - saving artifacts needs build output
//!   - an action whose inputs are missing settles as Failed, not as an error
//!   - the audit trail keeps only the newest 20 entries

use tracing::{info, warn};

use iip_contracts::{
    approval::Confirmation,
    audit::AuditResult,
    error::ConsoleResult,
    execution::Progress,
    pipeline::{Env, StepName},
};
use iip_core::{Console, ConsoleConfig};

use super::{print_audit_tail, run_approved, Rig};

/// Flood size for the audit bound check.
const FLOOD: usize = 25;

/// Print a guarded call's outcome. Returns true if the console refused it.
fn refused<T>(label: &str, result: ConsoleResult<T>) -> bool {
    match result {
        Err(e) => {
            println!("  [refused] {:<34} {}", label, e);
            true
        }
        Ok(_) => {
            warn!(check = label, "guardrail did not hold");
            println!("  [ALLOWED] {}", label);
            false
        }
    }
}

/// Run Scenario 3. The console is always PRD, whatever the rig says.
pub fn run_scenario(rig: &Rig) -> ConsoleResult<Console> {
    println!("=== Scenario 3: Guardrails (PRD) ===");
    println!();

    let config = ConsoleConfig { env: Env::Prd, ..rig.config.clone() };
    let mut console = rig.console_with(config)?;
    info!(env = %console.env(), "guardrails scenario started");

    let mut held = 0;
    let mut checks = 0;
    let mut check = |ok: bool| {
        checks += 1;
        if ok {
            held += 1;
        }
    };

    // ── The gate ──────────────────────────────────────────────────────────────

    let parked = matches!(
        console.run_named(StepName::Deploy, "Deploy Instance")?,
        Progress::AwaitingApproval { .. }
    );
    println!("  [gate]    Deploy Instance parked: {}", parked);
    check(parked);

    check(refused("dispatch while pending", console.run_named(StepName::Intent, "Compile Intent")));
    check(refused("lower-case phrase", console.approve(&Confirmation::new("approve", true))));
    check(refused("no second confirmation", console.approve(&Confirmation::new("APPROVE", false))));

    let cancelled = console.cancel();
    println!(
        "  [cancel]  {} (audit entries: {})",
        cancelled.as_ref().map_or("nothing pending", |r| r.action_name()),
        console.state().audit.len()
    );
    check(cancelled.is_some() && console.state().audit.is_empty());
    check(refused("approve with nothing pending", console.approve(&Confirmation::new("APPROVE", true))));
    println!();

    // ── Preconditions ─────────────────────────────────────────────────────────

    check(refused("save artifacts without build", console.request_save_artifacts()));
    check(refused("preview without build", console.preview_build_artifacts()));

    let design = run_approved(&mut console, StepName::Design, "Generate/Update API Spec")?;
    check(design.entry().result == AuditResult::Failed);
    println!();

    // ── Audit bound ───────────────────────────────────────────────────────────

    for _ in 0..FLOOD {
        console.run_named(StepName::Intent, "Show Assumptions")?;
    }
    let bounded = console.state().audit.len() == 20;
    println!("  [audit]   {} more actions, trail holds {}", FLOOD, console.state().audit.len());
    check(bounded);
    println!();

    print_audit_tail(&console, 2);
    println!();
    println!("  Guardrails held: {}/{}", held, checks);
    println!("  Scenario 3 complete.");
    println!();

    Ok(console)
}
