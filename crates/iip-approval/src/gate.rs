//! The human approval gate.
//!
//! At most one request waits at a time. While it waits the console refuses
//! to dispatch anything else. The gate itself never executes the deferred
//! operation: it only decides whether a confirmation is good enough and
//! hands the request back.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use iip_contracts::{
    approval::{ApprovalRequest, Confirmation},
    error::{ConsoleError, ConsoleResult},
    pipeline::Env,
};

/// The exact text an approver must type.
pub const CONFIRMATION_PHRASE: &str = "APPROVE";

/// The confirm-button rule.
///
/// The typed text must equal [`CONFIRMATION_PHRASE`] exactly (no trimming,
/// no case folding). In production the second confirmation is also needed.
pub fn confirmation_satisfied(env: Env, confirmation: &Confirmation) -> bool {
    confirmation.typed == CONFIRMATION_PHRASE
        && (!env.is_production() || confirmation.second_confirmation)
}

/// Holds the single pending approval request for a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApprovalGate {
    env: Env,
    pending: Option<ApprovalRequest>,
}

impl ApprovalGate {
    pub fn new(env: Env) -> Self {
        Self { env, pending: None }
    }

    pub fn env(&self) -> Env {
        self.env
    }

    /// Park `request` behind the gate.
    ///
    /// # Errors
    ///
    /// Returns `ConsoleError::ApprovalPending` naming the request already
    /// waiting. The waiting request is left untouched.
    pub fn open(&mut self, request: ApprovalRequest) -> ConsoleResult<()> {
        if let Some(existing) = &self.pending {
            warn!(
                pending = %existing.action_name(),
                rejected = %request.action_name(),
                "approval gate already open"
            );
            return Err(ConsoleError::ApprovalPending {
                action: existing.action_name().to_string(),
            });
        }

        info!(
            action = %request.action_name(),
            risk = %request.risk(),
            env = %self.env,
            "approval requested"
        );
        self.pending = Some(request);
        Ok(())
    }

    /// The request currently waiting, if any.
    pub fn pending(&self) -> Option<&ApprovalRequest> {
        self.pending.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    /// Check `confirmation` against the pending request.
    ///
    /// A rejected confirmation leaves the request pending so the approver
    /// can try again.
    pub fn authorize(&self, confirmation: &Confirmation) -> ConsoleResult<()> {
        let request = self.pending.as_ref().ok_or(ConsoleError::NoPendingApproval)?;

        if confirmation.typed != CONFIRMATION_PHRASE {
            debug!(action = %request.action_name(), "confirmation phrase mismatch");
            return Err(ConsoleError::ConfirmationRejected {
                reason: format!("type exactly '{CONFIRMATION_PHRASE}' to confirm"),
            });
        }
        if !confirmation_satisfied(self.env, confirmation) {
            debug!(action = %request.action_name(), "second confirmation missing");
            return Err(ConsoleError::ConfirmationRejected {
                reason: format!("{} requires a second confirmation", self.env),
            });
        }

        Ok(())
    }

    /// Clear the gate, returning whatever was waiting.
    pub fn close(&mut self) -> Option<ApprovalRequest> {
        let request = self.pending.take();
        if let Some(r) = &request {
            debug!(action = %r.action_name(), "approval gate closed");
        }
        request
    }
}
