//! # iip-approval
//!
//! Approval gate for `[H]` actions and artifact writes.
//!
//! The gate is a value, not a service: the console owns one `ApprovalGate`
//! per session and consults it before dispatching. Approving is a
//! two-step affair for the caller:
//!
//! ```rust,ignore
//! gate.authorize(&confirmation)?;
//! let request = gate.close();
//! // ...execute the request with its approval requirement cleared
//! ```

pub mod gate;

pub use gate::{confirmation_satisfied, ApprovalGate, CONFIRMATION_PHRASE};

// ── Tests ─────────────────────────────────────────────────────────────────────
