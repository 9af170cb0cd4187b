//! Scenario 2: Deploy and Debug
//!
//! Reproduces the seeded deployment failure and walks the debug loop:
//!   1. Deploy Instance is approved and fails on a missing config property
//!   2. Evidence is collected for the failed release
//!   3. Trace drilldown and root-cause localization point at the config
//!   4. The config patch is approved and written to the workspace

use tracing::info;

use iip_contracts::{error::ConsoleResult, pipeline::StepName};
use iip_core::{Console, ConsoleConfig};

use super::{print_audit_tail, run_approved, Rig};

/// Run Scenario 2. The seeded deploy failure is always enabled here.
pub fn run_scenario(rig: &Rig) -> ConsoleResult<Console> {
    println!("=== Scenario 2: Deploy and Debug ===");
    println!();

    let config = ConsoleConfig { simulate_deploy_failure: true, ..rig.config.clone() };
    let mut console = rig.console_with(config)?;
    info!(env = %console.env(), "deploy/debug scenario started");

    // ── Failed deploy ─────────────────────────────────────────────────────────

    run_approved(&mut console, StepName::Deploy, "Pre-deploy Checklist")?;
    run_approved(&mut console, StepName::Deploy, "Deploy Instance")?;

    if let Some(release) = console.state().outputs.deploy.as_ref().and_then(|d| d.release.as_ref()) {
        println!("  Release: {} -> {:?} ({})", release.release_id, release.status, release.deploy_target);
        if let Some(logs) = &release.logs_ref {
            println!("  Logs:    {}", logs);
        }
    }
    println!();

    // ── Evidence and diagnosis ────────────────────────────────────────────────

    run_approved(&mut console, StepName::Observe, "Collect Evidence")?;
    if let Some(evidence) = &console.state().outputs.evidence {
        println!("  Evidence: {}", evidence.evidence_summary);
    }

    run_approved(&mut console, StepName::Debug, "Trace Drilldown")?;
    run_approved(&mut console, StepName::Debug, "Root Cause Localization")?;

    if let Some(debug) = &console.state().outputs.debug {
        if let Some(trace) = &debug.trace {
            for step in trace.steps.iter().filter(|s| !s.ok) {
                println!("  Failing span: {} ({} ms)", step.step, step.latency_ms);
            }
        }
        if let Some(cause) = &debug.root_cause {
            println!(
                "  Root cause:   {} ({:.0}% confidence)",
                cause.classification,
                cause.confidence * 100.0
            );
            println!("  Fix:          {}", cause.recommended_fix);
        }
    }
    println!();

    // ── Patch ─────────────────────────────────────────────────────────────────

    run_approved(&mut console, StepName::Debug, "Apply Patch (Commit)")?;
    if let Some(patch) = &console.state().outputs.patch {
        for file in &patch.files {
            println!("  Patched {} -> sha256 {}", file.file_path, file.after_sha256);
            for line in file.diff.lines().filter(|l| !l.starts_with("  ")) {
                println!("    {}", line);
            }
        }
    }
    run_approved(&mut console, StepName::Observe, "Troubleshooting Summary")?;
    println!();

    print_audit_tail(&console, 4);
    println!();
    println!("  Scenario 2 complete.");
    println!();

    Ok(console)
}

#[cfg(test)]
mod tests {
    use iip_contracts::{
        artifacts::{ReleaseStatus, PROPERTIES_PATH},
        pipeline::{Env, StepState},
    };

    use super::*;

    #[test]
    fn deploy_fails_even_when_rig_disables_failure() {
        let rig = Rig::new(ConsoleConfig { simulate_deploy_failure: false, ..ConsoleConfig::default() }, false);
        let console = run_scenario(&rig).unwrap();

        let release = console.state().outputs.deploy.as_ref().unwrap().release.as_ref().unwrap();
        assert_eq!(release.status, ReleaseStatus::Failed);
        assert!(release.error.is_some());
    }

    #[test]
    fn debug_loop_settles_every_step() {
        let console = run_scenario(&Rig::default()).unwrap();
        let state = |name| console.state().step_named(name).map(|s| s.state);

        assert_eq!(state(StepName::Deploy), Some(StepState::Failed));
        assert_eq!(state(StepName::Observe), Some(StepState::Success));
        assert_eq!(state(StepName::Debug), Some(StepState::Success));
    }

    #[test]
    fn debug_outputs_are_merged() {
        let console = run_scenario(&Rig::default()).unwrap();
        let debug = console.state().outputs.debug.as_ref().unwrap();

        assert!(debug.trace.is_some());
        assert!(debug.root_cause.is_some());
        let evidence = console.state().outputs.evidence.as_ref().unwrap();
        assert!(evidence.release_id.as_deref().unwrap().starts_with("rel-"));
    }

    #[test]
    fn patch_targets_config_properties() {
        let rig = Rig::new(ConsoleConfig { env: Env::Prd, ..ConsoleConfig::default() }, false);
        let console = run_scenario(&rig).unwrap();

        let patch = console.state().outputs.patch.as_ref().unwrap();
        assert_eq!(patch.files.len(), 1);
        assert_eq!(patch.files[0].file_path, PROPERTIES_PATH);
        assert!(patch.files[0].before_sha256.is_none());
        assert!(patch.rollback.supported);
    }
}
