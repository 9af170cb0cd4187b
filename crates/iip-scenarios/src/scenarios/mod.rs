//! Console walkthrough scenarios.
//!
//! Each scenario builds its own `Console` from a shared `Rig`, drives it
//! through a fixed script and returns the console so callers can inspect
//! the final session.

pub mod deploy_debug;
pub mod guardrails;
pub mod happy_path;

use iip_contracts::{
    approval::Confirmation,
    error::ConsoleResult,
    execution::{Dispatch, Progress},
    pipeline::StepName,
};
use iip_core::{
    Clock, Console, ConsoleConfig, FsWorkspace, ManualClock, MemoryWorkspace, SystemClock, Workspace,
};

/// How scenario consoles are built.
#[derive(Debug, Clone, Default)]
pub struct Rig {
    pub config: ConsoleConfig,
    /// Wait out simulated delays on the wall clock instead of virtual time.
    pub realtime: bool,
}

impl Rig {
    pub fn new(config: ConsoleConfig, realtime: bool) -> Self {
        Self { config, realtime }
    }

    pub fn console(&self) -> ConsoleResult<Console> {
        self.console_with(self.config.clone())
    }

    /// Build a console from `config`, keeping this rig's clock and workspace choice.
    pub fn console_with(&self, config: ConsoleConfig) -> ConsoleResult<Console> {
        let clock: Box<dyn Clock> = if self.realtime {
            Box::new(SystemClock)
        } else {
            Box::new(ManualClock::new())
        };
        let workspace: Box<dyn Workspace> = match &config.workspace_root {
            Some(root) => Box::new(FsWorkspace::new(root)),
            None => Box::new(MemoryWorkspace::new()),
        };
        Console::new(config, clock, workspace)
    }
}

// ── Shared script steps ───────────────────────────────────────────────────────

/// The confirmation a careful operator gives in `console`'s environment.
pub(crate) fn confirmation_for(console: &Console) -> Confirmation {
    Confirmation::new("APPROVE", console.env().is_production())
}

/// Run one graph action, approving it if it stops at the gate.
pub(crate) fn run_approved(console: &mut Console, step: StepName, action: &str) -> ConsoleResult<Dispatch> {
    let progress = match console.run_named(step, action)? {
        Progress::AwaitingApproval { request } => {
            println!("  [gate]  {} ({} risk) awaiting approval", request.action_name(), request.risk());
            console.approve_and_run(&confirmation_for(console))?
        }
        other => other,
    };
    let dispatch = progress.settled()?;
    print_dispatch(step.as_str(), action, &dispatch);
    Ok(dispatch)
}

pub(crate) fn print_dispatch(step: &str, action: &str, dispatch: &Dispatch) {
    let entry = dispatch.entry();
    println!("  {:<8} {:<28} {:?}: {}", step, action, entry.result, entry.message);
}

pub(crate) fn print_audit_tail(console: &Console, count: usize) {
    let audit = &console.state().audit;
    println!("  Audit trail: {} entr{} (newest first)", audit.len(), if audit.len() == 1 { "y" } else { "ies" });
    for entry in audit.entries().take(count) {
        println!("    {} | {} / {} | {:?}", entry.ts.format("%H:%M:%S%.3f"), entry.step_name, entry.action_name, entry.result);
    }
}
