//! Dispatch results returned by the console.
//!
//! Running an action is two-phase: `dispatch` moves the step to `Running`
//! and hands back a `RunTicket`; `complete` redeems the ticket once the
//! simulated delay has elapsed. Callers that do not care about the split
//! drive both phases through a clock.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    approval::ApprovalRequest,
    audit::AuditEntry,
    error::{ConsoleError, ConsoleResult},
    pipeline::{ActionKind, StepId, StepName, StepState},
};

/// A started action waiting for its simulated work to finish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunTicket {
    pub step_id: StepId,
    pub step_name: StepName,
    pub action_name: String,
    /// `None` when the (step, action) pair has no dedicated handler.
    pub kind: Option<ActionKind>,
    /// How long the caller should wait before calling `complete`.
    #[serde(with = "duration_millis")]
    pub delay: Duration,
}

/// Where a request to the console stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Progress {
    /// The step is `Running`; redeem the ticket to finish it.
    Running { ticket: RunTicket },
    /// Nothing ran; the request is parked behind the approval gate.
    AwaitingApproval { request: ApprovalRequest },
    /// The operation has fully resolved.
    Done { dispatch: Dispatch },
}

impl Progress {
    /// The resolved operation, or `Unsettled` while the request is still open.
    pub fn settled(self) -> ConsoleResult<Dispatch> {
        match self {
            Progress::Done { dispatch } => Ok(dispatch),
            Progress::Running { ticket } => Err(ConsoleError::Unsettled { action: ticket.action_name }),
            Progress::AwaitingApproval { request } => Err(ConsoleError::Unsettled {
                action: request.action_name().to_string(),
            }),
        }
    }
}

/// A resolved operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Dispatch {
    /// An action ran and its step settled.
    #[serde(rename_all = "camelCase")]
    Completed {
        step_id: StepId,
        state: StepState,
        entry: AuditEntry,
    },
    /// The build artifacts were (fully or partially) written.
    Saved {
        /// Paths written before the batch finished or failed.
        written: Vec<String>,
        entry: AuditEntry,
    },
}

impl Dispatch {
    /// The audit entry this operation appended.
    pub fn entry(&self) -> &AuditEntry {
        match self {
            Dispatch::Completed { entry, .. } | Dispatch::Saved { entry, .. } => entry,
        }
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
