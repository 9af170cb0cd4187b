//! Console configuration loaded from TOML.
//!
//! Every key is optional:
//!
//! ```toml
//! env = "STG"
//! requirement = "Expose account balances from the core banking system."
//! delay_scale = 0.0              # 1.0 = the nominal mock delays
//! simulate_deploy_failure = true # the first deploy fails on config
//! workspace_root = "./workspace"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use iip_contracts::{
    error::{ConsoleError, ConsoleResult},
    pipeline::Env,
};

use crate::mock_data::DEFAULT_REQUIREMENT;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    /// Deployment tier of the session.
    pub env: Env,

    /// Initial requirement text fed to Compile Intent.
    pub requirement: String,

    /// Multiplier applied to every simulated delay. `0.0` disables waiting.
    pub delay_scale: f64,

    /// Whether Deploy Instance reports the seeded configuration failure.
    pub simulate_deploy_failure: bool,

    /// Directory artifacts are written under. `None` means the caller decides.
    pub workspace_root: Option<PathBuf>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            env: Env::Dev,
            requirement: DEFAULT_REQUIREMENT.to_string(),
            delay_scale: 1.0,
            simulate_deploy_failure: true,
            workspace_root: None,
        }
    }
}

impl ConsoleConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `ConsoleError::ConfigError` for malformed TOML, unknown keys,
    /// or a negative or non-finite `delay_scale`.
    pub fn from_toml_str(s: &str) -> ConsoleResult<Self> {
        let config: ConsoleConfig = toml::from_str(s).map_err(|e| ConsoleError::ConfigError {
            reason: format!("failed to parse console TOML: {e}"),
        })?;
        config.validate()?;
        debug!(env = %config.env, delay_scale = config.delay_scale, "console config loaded");
        Ok(config)
    }

    /// Read and parse the TOML file at `path`.
    pub fn from_file(path: &Path) -> ConsoleResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConsoleError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> ConsoleResult<()> {
        if !self.delay_scale.is_finite() || self.delay_scale < 0.0 {
            return Err(ConsoleError::ConfigError {
                reason: format!("delay_scale must be a non-negative number, got {}", self.delay_scale),
            });
        }
        Ok(())
    }

    /// `nominal` stretched by `delay_scale`, rounded to the nanosecond.
    pub fn scale(&self, nominal: Duration) -> Duration {
        Duration::from_nanos((nominal.as_nanos() as f64 * self.delay_scale).round() as u64)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
