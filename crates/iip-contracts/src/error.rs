//! Error types for the console runtime.
//!
//! All fallible operations return `ConsoleResult<T>`. A failed precondition
//! inside a mock action is NOT an error: it settles the step as `Failed` and
//! is reported through the audit trail instead.

use thiserror::Error;

/// The unified error type for the IIP console.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// No step with this id exists in the session graph.
    #[error("step '{step_id}' not found in session graph")]
    StepNotFound { step_id: String },

    /// The step exists but has no action with this id or name.
    #[error("action '{action}' not found on step '{step}'")]
    ActionNotFound { step: String, action: String },

    /// Dispatch is suspended while a request waits at the approval gate.
    #[error("approval pending for '{action}'; approve or cancel it first")]
    ApprovalPending { action: String },

    /// A script expected a resolved operation but the request is still open.
    #[error("'{action}' has not settled")]
    Unsettled { action: String },

    /// Approve or cancel was called with nothing waiting.
    #[error("no approval request is pending")]
    NoPendingApproval,

    /// The operator's confirmation does not satisfy the gate.
    #[error("confirmation rejected: {reason}")]
    ConfirmationRejected { reason: String },

    /// An artifact operation needs build output that does not exist yet.
    #[error("no build artifacts in session; run a Build action first")]
    MissingBuildArtifacts,

    /// The supplied workspace path is empty or otherwise unusable.
    #[error("Invalid path")]
    InvalidPath,

    /// A workspace write failed.
    #[error("failed to write '{path}': {reason}")]
    WriteFailed { path: String, reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

/// Convenience alias used throughout the IIP crates.
pub type ConsoleResult<T> = Result<T, ConsoleError>;
