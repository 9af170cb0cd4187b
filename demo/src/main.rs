//! IIP Agent Console: Demo CLI
//!
//! Runs one or all of the scripted console walkthroughs. Each scenario drives
//! a real `Console` (gate, audit trail, mock agents) with scripted approvals.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- happy-path --env STG
//!   cargo run -p demo -- deploy-debug --workspace ./scratch
//!   cargo run -p demo -- guardrails --realtime

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use iip_contracts::{error::ConsoleResult, pipeline::Env};
use iip_core::ConsoleConfig;
use iip_scenarios::{
    scenarios::{deploy_debug, guardrails, happy_path},
    Rig,
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// IIP agent console scripted demo.
///
/// Each subcommand runs one or all of the walkthroughs, showing the approval
/// gate, the audit trail and the seeded pipeline failures.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "IIP agent console scripted demo",
    long_about = "Runs IIP agent console walkthroughs showing approval gating,\n\
                  audit recording, auto-judging and the deploy/debug loop."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    opts: RigOpts,
}

#[derive(Subcommand)]
enum Command {
    /// Run all three scenarios in sequence.
    RunAll,
    /// Scenario 1: Intent through Test, artifact save, seeded judge failure.
    HappyPath,
    /// Scenario 2: Seeded deploy failure and the debug loop.
    DeployDebug,
    /// Scenario 3: Gate, confirmation and precondition refusals (always PRD).
    Guardrails,
}

#[derive(Args)]
struct RigOpts {
    /// Deployment tier (DEV, STG or PRD). Overrides the config file.
    #[arg(long, global = true)]
    env: Option<Env>,

    /// TOML console configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write artifacts under this directory instead of in memory.
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Wait out simulated delays on the wall clock.
    #[arg(long, global = true)]
    realtime: bool,
}

impl RigOpts {
    fn into_rig(self) -> ConsoleResult<Rig> {
        let mut config = match &self.config {
            Some(path) => ConsoleConfig::from_file(path)?,
            None => ConsoleConfig::default(),
        };
        if let Some(env) = self.env {
            config.env = env;
        }
        if let Some(root) = self.workspace {
            config.workspace_root = Some(root);
        }
        Ok(Rig::new(config, self.realtime))
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug to see every dispatch.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = cli.opts.into_rig().and_then(|rig| match cli.command {
        Command::RunAll => run_all(&rig),
        Command::HappyPath => happy_path::run_scenario(&rig).map(drop),
        Command::DeployDebug => deploy_debug::run_scenario(&rig).map(drop),
        Command::Guardrails => guardrails::run_scenario(&rig).map(drop),
    });

    match result {
        Ok(()) => {
            println!("All selected scenarios completed.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

fn run_all(rig: &Rig) -> ConsoleResult<()> {
    happy_path::run_scenario(rig)?;
    deploy_debug::run_scenario(rig)?;
    guardrails::run_scenario(rig)?;
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("IIP Agent Console");
    println!("Scripted Pipeline Demo");
    println!("======================");
    println!();
    println!("Per action:");
    println!("  [1] Gate check: nothing dispatches while an approval is pending");
    println!("  [2] [H] actions park at the gate until 'APPROVE' (plus a second confirmation in PRD)");
    println!("  [3] Step -> Running, simulated agent delay");
    println!("  [4] Mock agent runs; missing inputs fail the step, never the console");
    println!("  [5] Step settles; one entry prepended to the 20-entry audit trail");
    println!();
}
