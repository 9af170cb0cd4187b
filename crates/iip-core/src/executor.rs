//! The console: drives one session through the action pipeline.
//!
//! Every request goes through the same gatekeeping before anything runs:
//!
//!   Gate open? → Step exists? → Needs approval? → Running → [handler] → Settle + Audit
//!
//! Running an action is split in two so that async callers can release the
//! console while the simulated agent "works":
//!
//! - `dispatch` marks the step `Running` and returns a `RunTicket`
//! - `complete` runs the handler for that ticket and settles the step
//!
//! `run` does both, waiting out the ticket's delay on the injected clock.
//! Two tickets for the same step may be in flight at once; whichever
//! completes last decides the step's final state.

use serde::Serialize;
use tracing::{debug, info, warn};

use iip_approval::ApprovalGate;
use iip_contracts::{
    approval::{ApprovalRequest, Confirmation},
    artifacts::ArtifactPreview,
    audit::{AuditEntry, AuditResult},
    error::{ConsoleError, ConsoleResult},
    execution::{Dispatch, Progress, RunTicket},
    pipeline::{ActionId, ActionItem, ActionKind, Env, Step, StepId, StepName, StepState, FALLBACK_DELAY},
};
use iip_judge::diff::simple_line_diff;

use crate::{
    actions::{handler_for, ActionContext},
    config::ConsoleConfig,
    session::{SessionEvent, SessionState},
    traits::{Clock, Workspace},
    workspace::digest,
};

/// Audit step and action names used for artifact writes.
const SAVE_STEP: &str = "Build";
const SAVE_ACTION: &str = "Write artifacts";

/// Serializable view of the whole session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot<'a> {
    #[serde(flatten)]
    pub state: &'a SessionState,
    pub pending_approval: Option<&'a ApprovalRequest>,
}

/// One console session.
///
/// The console owns the session state, the approval gate and the two
/// outside-world seams. Nothing else mutates the session.
pub struct Console {
    config: ConsoleConfig,
    state: SessionState,
    gate: ApprovalGate,
    clock: Box<dyn Clock>,
    workspace: Box<dyn Workspace>,
}

impl Console {
    /// Start a session with a fresh graph for `config.env`.
    ///
    /// Returns `ConsoleError::ConfigError` if `config` does not validate.
    pub fn new(
        config: ConsoleConfig,
        clock: Box<dyn Clock>,
        workspace: Box<dyn Workspace>,
    ) -> ConsoleResult<Self> {
        config.validate()?;
        let state = SessionState::new(config.env, config.requirement.clone());
        info!(env = %config.env, steps = state.steps.len(), "console session started");

        Ok(Self {
            gate: ApprovalGate::new(config.env),
            config,
            state,
            clock,
            workspace,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn env(&self) -> Env {
        self.config.env
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn graph(&self) -> &[Step] {
        &self.state.steps
    }

    pub fn step_state(&self, step_id: StepId) -> Option<StepState> {
        self.state.step_state(step_id)
    }

    pub fn pending_approval(&self) -> Option<&ApprovalRequest> {
        self.gate.pending()
    }

    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot { state: &self.state, pending_approval: self.gate.pending() }
    }

    /// Look up a step and one of its actions by display name.
    pub fn find_action(&self, step: StepName, action_name: &str) -> ConsoleResult<(StepId, ActionItem)> {
        let found = self.state.step_named(step).ok_or_else(|| ConsoleError::StepNotFound {
            step_id: step.to_string(),
        })?;
        let action = found.action_named(action_name).ok_or_else(|| ConsoleError::ActionNotFound {
            step: step.to_string(),
            action: action_name.to_string(),
        })?;
        Ok((found.id, action.clone()))
    }

    // ── Session edits ─────────────────────────────────────────────────────────

    pub fn set_requirement(&mut self, text: impl Into<String>) {
        self.state.apply(SessionEvent::RequirementChanged(text.into()));
    }

    /// Mark a step `Skipped`. No audit entry; nothing ran.
    pub fn skip_step(&mut self, step_id: StepId) -> ConsoleResult<()> {
        self.require_step(step_id)?;
        self.state.apply(SessionEvent::StepStateChanged { step_id, state: StepState::Skipped });
        Ok(())
    }

    // ── Action execution ──────────────────────────────────────────────────────

    /// Start `action` on `step_id`.
    ///
    /// Returns `AwaitingApproval` (nothing ran) for actions that require
    /// approval, otherwise `Running` with a ticket to redeem via `complete`.
    /// `action` does not have to come from the graph; names with no
    /// dedicated handler run the fallback.
    ///
    /// # Errors
    ///
    /// `ApprovalPending` while any request waits at the gate, and
    /// `StepNotFound` for an unknown step.
    pub fn dispatch(&mut self, step_id: StepId, action: &ActionItem) -> ConsoleResult<Progress> {
        if let Some(pending) = self.gate.pending() {
            return Err(ConsoleError::ApprovalPending { action: pending.action_name().to_string() });
        }
        let step_name = self.require_step(step_id)?.name;

        if action.requires_approval {
            let request = ApprovalRequest::Action { step_id, step_name, action: action.clone() };
            self.gate.open(request.clone())?;
            return Ok(Progress::AwaitingApproval { request });
        }

        let kind = ActionKind::resolve(step_name, &action.name);
        let delay = self.config.scale(kind.map_or(FALLBACK_DELAY, ActionKind::simulated_delay));
        self.state.apply(SessionEvent::StepStateChanged { step_id, state: StepState::Running });

        debug!(step = %step_name, action = %action.name, ?kind, delay_ms = delay.as_millis() as u64, "action dispatched");

        Ok(Progress::Running {
            ticket: RunTicket { step_id, step_name, action_name: action.name.clone(), kind, delay },
        })
    }

    /// `dispatch` for an action already in the graph.
    pub fn dispatch_by_id(&mut self, step_id: StepId, action_id: ActionId) -> ConsoleResult<Progress> {
        let step = self.require_step(step_id)?;
        let action = step.action(action_id).cloned().ok_or_else(|| ConsoleError::ActionNotFound {
            step: step.name.to_string(),
            action: action_id.to_string(),
        })?;
        self.dispatch(step_id, &action)
    }

    /// Run the handler for `ticket`, settle its step and append one audit entry.
    pub fn complete(&mut self, ticket: RunTicket) -> ConsoleResult<Dispatch> {
        self.require_step(ticket.step_id)?;

        let outcome = {
            let ctx = ActionContext {
                env: self.config.env,
                requirement: &self.state.requirement,
                outputs: &self.state.outputs,
                now: self.clock.now(),
                step_name: ticket.step_name,
                action_name: &ticket.action_name,
                workspace: self.workspace.as_ref(),
                simulate_deploy_failure: self.config.simulate_deploy_failure,
            };
            handler_for(ticket.kind)(&ctx)
        };

        for update in outcome.updates {
            self.state.apply(SessionEvent::OutputStored(update));
        }
        self.state.apply(SessionEvent::StepStateChanged { step_id: ticket.step_id, state: outcome.state });
        let entry = self.record(
            ticket.step_name.as_str(),
            &ticket.action_name,
            AuditResult::from_state(outcome.state),
            outcome.message,
        );

        Ok(Dispatch::Completed { step_id: ticket.step_id, state: outcome.state, entry })
    }

    /// `dispatch`, wait out the delay on the clock, then `complete`.
    pub fn run(&mut self, step_id: StepId, action: &ActionItem) -> ConsoleResult<Progress> {
        let progress = self.dispatch(step_id, action)?;
        self.finish(progress)
    }

    /// `run` for the graph action named `action_name` on `step`.
    pub fn run_named(&mut self, step: StepName, action_name: &str) -> ConsoleResult<Progress> {
        let (step_id, action) = self.find_action(step, action_name)?;
        self.run(step_id, &action)
    }

    // ── Approval ──────────────────────────────────────────────────────────────

    /// Resolve the pending request with `confirmation`.
    ///
    /// An approved action is dispatched with its approval requirement
    /// cleared and comes back `Running`. An approved save writes at once and
    /// comes back `Done`. A rejected confirmation leaves the request pending.
    pub fn approve(&mut self, confirmation: &Confirmation) -> ConsoleResult<Progress> {
        self.gate.authorize(confirmation)?;
        let request = self.gate.close().ok_or(ConsoleError::NoPendingApproval)?;
        info!(action = %request.action_name(), env = %self.config.env, "approval granted");

        match request {
            ApprovalRequest::SaveArtifacts { .. } => {
                Ok(Progress::Done { dispatch: self.save_build_artifacts()? })
            }
            ApprovalRequest::Action { step_id, action, .. } => {
                self.dispatch(step_id, &action.without_approval())
            }
        }
    }

    /// `approve`, then finish a started action on the clock.
    pub fn approve_and_run(&mut self, confirmation: &Confirmation) -> ConsoleResult<Progress> {
        let progress = self.approve(confirmation)?;
        self.finish(progress)
    }

    /// Drop the pending request. Nothing runs and nothing is audited.
    pub fn cancel(&mut self) -> Option<ApprovalRequest> {
        let request = self.gate.close();
        if let Some(r) = &request {
            info!(action = %r.action_name(), "approval cancelled");
        }
        request
    }

    // ── Build artifacts ───────────────────────────────────────────────────────

    /// Diff each build artifact against the workspace copy and remember the
    /// result in the session.
    pub fn preview_build_artifacts(&mut self) -> ConsoleResult<Vec<ArtifactPreview>> {
        let build = self.state.outputs.build.as_ref().ok_or(ConsoleError::MissingBuildArtifacts)?;

        let previews: Vec<ArtifactPreview> = build
            .targets()
            .iter()
            .map(|(path, proposed)| {
                let current = self.workspace.read(path).unwrap_or_default();
                ArtifactPreview {
                    path: path.to_string(),
                    unchanged: current.exists && current.content == *proposed,
                    current_sha256: current.exists.then(|| digest(&current.content)),
                    proposed_sha256: digest(proposed),
                    diff: simple_line_diff(&current.content, proposed),
                }
            })
            .collect();

        debug!(
            changed = previews.iter().filter(|p| !p.unchanged).count(),
            "build artifact preview computed"
        );
        self.state.apply(SessionEvent::DiffsPreviewed(previews.clone()));
        Ok(previews)
    }

    /// Park an artifact save behind the approval gate.
    pub fn request_save_artifacts(&mut self) -> ConsoleResult<Progress> {
        if self.state.outputs.build.is_none() {
            return Err(ConsoleError::MissingBuildArtifacts);
        }
        let request = ApprovalRequest::save_artifacts();
        self.gate.open(request.clone())?;
        Ok(Progress::AwaitingApproval { request })
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn require_step(&self, step_id: StepId) -> ConsoleResult<&Step> {
        self.state.step(step_id).ok_or_else(|| ConsoleError::StepNotFound {
            step_id: step_id.to_string(),
        })
    }

    fn finish(&mut self, progress: Progress) -> ConsoleResult<Progress> {
        match progress {
            Progress::Running { ticket } => {
                self.clock.sleep(ticket.delay);
                Ok(Progress::Done { dispatch: self.complete(ticket)? })
            }
            other => Ok(other),
        }
    }

    fn record(&mut self, step_name: &str, action_name: &str, result: AuditResult, message: String) -> AuditEntry {
        let entry = AuditEntry {
            ts: self.clock.now(),
            step_name: step_name.to_string(),
            action_name: action_name.to_string(),
            result,
            message,
        };
        self.state.apply(SessionEvent::AuditAppended(entry.clone()));
        entry
    }

    /// Write the three build files in order, stopping at the first failure.
    ///
    /// Files written before a failure stay written.
    fn save_build_artifacts(&mut self) -> ConsoleResult<Dispatch> {
        let build = self.state.outputs.build.clone().ok_or(ConsoleError::MissingBuildArtifacts)?;

        let mut written = Vec::new();
        let mut failure = None;
        for (path, content) in build.targets() {
            match self.workspace.write(path, content) {
                Ok(()) => written.push(path.to_string()),
                Err(e) => {
                    warn!(path, written = written.len(), error = %e, "artifact save stopped");
                    failure = Some(e);
                    break;
                }
            }
        }

        let entry = match failure {
            None => self.record(
                SAVE_STEP,
                SAVE_ACTION,
                AuditResult::Success,
                "Artifacts written under artifacts/mule/ (approved).".to_string(),
            ),
            Some(e) => self.record(SAVE_STEP, SAVE_ACTION, AuditResult::Failed, e.to_string()),
        };

        Ok(Dispatch::Saved { written, entry })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
