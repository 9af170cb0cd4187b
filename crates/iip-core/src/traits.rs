//! Seams between the console and the outside world.
//!
//! - `Clock`     : wall time and the simulated "agent is working" pause
//! - `Workspace` : the directory generated artifacts are written into
//!
//! The console never touches `std::time` or `std::fs` directly. Tests swap
//! in `ManualClock` and `MemoryWorkspace` and run without waiting or disk.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use iip_contracts::error::ConsoleResult;

/// Source of timestamps and of the simulated processing delay.
pub trait Clock: Send + Sync {
    /// Current time, used for audit entries and artifact timestamps.
    fn now(&self) -> DateTime<Utc>;

    /// Block for `duration`. Virtual clocks return immediately.
    fn sleep(&self, duration: Duration);
}

/// Result of reading a workspace file.
///
/// A failed read is never an error: it is reported as a file that does not
/// exist, with empty content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRead {
    pub exists: bool,
    pub content: String,
}

impl FileRead {
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn found(content: impl Into<String>) -> Self {
        Self { exists: true, content: content.into() }
    }
}

/// Text file storage rooted at some directory.
///
/// Paths are workspace-relative strings such as `artifacts/mule/config.properties`.
pub trait Workspace: Send + Sync {
    /// Read `path` as text.
    ///
    /// Returns `ConsoleError::InvalidPath` only when `path` is unusable
    /// (e.g. empty). Any I/O failure yields `FileRead::missing()`.
    fn read(&self, path: &str) -> ConsoleResult<FileRead>;

    /// Create parent directories as needed and overwrite `path` with `content`.
    ///
    /// Returns `ConsoleError::WriteFailed` when the write does not happen.
    fn write(&self, path: &str, content: &str) -> ConsoleResult<()>;
}
