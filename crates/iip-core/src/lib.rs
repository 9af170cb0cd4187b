//! # iip-core
//!
//! The session runtime for the IIP agent console.
//!
//! This crate provides:
//! - The seven-step pipeline graph and the session reducer that owns it
//! - The mock agents behind each action
//! - The `Console` that routes every action through the approval gate,
//!   settles its step and records the audit trail
//! - The two outside-world seams, `Clock` and `Workspace`, with real and
//!   test implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use iip_core::{Console, ConsoleConfig, SystemClock, FsWorkspace};
//!
//! let mut console = Console::new(
//!     ConsoleConfig::default(),
//!     Box::new(SystemClock),
//!     Box::new(FsWorkspace::current_dir()?),
//! )?;
//! console.run_named(StepName::Intent, "Compile Intent")?;
//! ```

pub mod actions;
pub mod clock;
pub mod config;
pub mod executor;
pub mod graph;
pub mod mock_data;
pub mod session;
pub mod traits;
pub mod workspace;

pub use clock::{ManualClock, SystemClock};
pub use config::ConsoleConfig;
pub use executor::{Console, SessionSnapshot};
pub use graph::create_session_graph;
pub use session::{SessionOutputs, SessionState};
pub use traits::{Clock, FileRead, Workspace};
pub use workspace::{FsWorkspace, MemoryWorkspace};
