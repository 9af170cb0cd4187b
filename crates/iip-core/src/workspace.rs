//! `Workspace` implementations and content digests.
//!
//! `FsWorkspace` joins every path onto a root directory. Leading slashes are
//! stripped first so an absolute-looking path still lands under the root.
//! `..` segments are NOT rejected; the workspace is a convenience, not a
//! sandbox.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use iip_contracts::error::{ConsoleError, ConsoleResult};

use crate::traits::{FileRead, Workspace};

/// SHA-256 of `content`, lowercase hex.
pub fn digest(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Reject the empty path, then strip leading separators. `"/"` names the root.
fn normalize(path: &str) -> ConsoleResult<&str> {
    if path.is_empty() {
        return Err(ConsoleError::InvalidPath);
    }
    Ok(path.trim_start_matches('/'))
}

// ── Filesystem ────────────────────────────────────────────────────────────────

/// A workspace backed by a real directory.
#[derive(Debug, Clone)]
pub struct FsWorkspace {
    root: PathBuf,
}

impl FsWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Rooted at the process working directory.
    pub fn current_dir() -> ConsoleResult<Self> {
        let root = std::env::current_dir().map_err(|e| ConsoleError::ConfigError {
            reason: format!("cannot determine working directory: {e}"),
        })?;
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The absolute location `path` maps to.
    pub fn resolve(&self, path: &str) -> ConsoleResult<PathBuf> {
        Ok(self.root.join(normalize(path)?))
    }
}

impl Workspace for FsWorkspace {
    fn read(&self, path: &str) -> ConsoleResult<FileRead> {
        let full = self.resolve(path)?;
        match std::fs::read_to_string(&full) {
            Ok(content) => Ok(FileRead::found(content)),
            Err(e) => {
                debug!(path = %full.display(), error = %e, "workspace read failed; treating as missing");
                Ok(FileRead::missing())
            }
        }
    }

    fn write(&self, path: &str, content: &str) -> ConsoleResult<()> {
        let full = self.resolve(path)?;
        let fail = |e: std::io::Error| {
            warn!(path = %full.display(), error = %e, "workspace write failed");
            ConsoleError::WriteFailed { path: path.to_string(), reason: e.to_string() }
        };

        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).map_err(fail)?;
        }
        std::fs::write(&full, content).map_err(fail)?;

        info!(path = %full.display(), bytes = content.len(), "workspace file written");
        Ok(())
    }
}

// ── In memory ─────────────────────────────────────────────────────────────────

/// A workspace held in a map. Clones share the same files.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkspace {
    files: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        if let Ok(mut files) = self.files.lock() {
            files.insert(path.trim_start_matches('/').to_string(), content.to_string());
        }
        self
    }

    /// Snapshot of every stored file.
    pub fn files(&self) -> BTreeMap<String, String> {
        self.files.lock().map(|f| f.clone()).unwrap_or_default()
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.files().get(path.trim_start_matches('/')).cloned()
    }
}

impl Workspace for MemoryWorkspace {
    fn read(&self, path: &str) -> ConsoleResult<FileRead> {
        let key = normalize(path)?;
        let files = self.files.lock().map_err(|e| ConsoleError::WriteFailed {
            path: key.to_string(),
            reason: format!("workspace lock poisoned: {e}"),
        })?;
        Ok(files.get(key).map(FileRead::found).unwrap_or_default())
    }

    fn write(&self, path: &str, content: &str) -> ConsoleResult<()> {
        let key = normalize(path)?;
        let mut files = self.files.lock().map_err(|e| ConsoleError::WriteFailed {
            path: key.to_string(),
            reason: format!("workspace lock poisoned: {e}"),
        })?;
        files.insert(key.to_string(), content.to_string());
        debug!(path = %key, bytes = content.len(), "memory workspace file written");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
