//! Invocation configuration.
//!
//! Everything an invocation needs from its environment is collected here once
//! and passed down explicitly.

use crate::error::{RepoError, Result};
use crate::redirect::DEFAULT_PROBE_TIMEOUT;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Overrides the root prefix.
pub const ROOT_ENV: &str = "REPOPREFIX";

/// Set to `1` to echo the clone invocation to standard error.
pub const VERBOSE_ENV: &str = "REPOVERBOSE";

/// Redirect probe timeout in seconds; `0` disables the probe.
pub const PROBE_TIMEOUT_ENV: &str = "REPOPROBETIMEOUT";

/// Configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base directory under which clones are placed.
    pub root: PathBuf,
    /// Echo the external clone invocation.
    pub verbose: bool,
    /// Redirect probe timeout; `None` skips the probe.
    pub probe_timeout: Option<Duration>,
}

impl Config {
    /// Build a configuration with defaults for everything but the root.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            verbose: false,
            probe_timeout: Some(DEFAULT_PROBE_TIMEOUT),
        }
    }

    /// Read the configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`RepoError::HomeDirectoryUnavailable`] when `REPOPREFIX` is
    /// unset and no home directory can be determined.
    pub fn from_env() -> Result<Self> {
        let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        let root = resolve_root(std::env::var_os(ROOT_ENV), home)?;

        let verbose = std::env::var(VERBOSE_ENV).is_ok_and(|v| v == "1");

        Ok(Self {
            root,
            verbose,
            probe_timeout: Some(DEFAULT_PROBE_TIMEOUT),
        })
    }

    /// Set the probe timeout from whole seconds; `0` disables probing.
    #[must_use]
    pub fn with_probe_timeout_secs(mut self, secs: u64) -> Self {
        self.probe_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    /// Root prefix.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Pick the root prefix: a non-empty override, else `<home>/.local/src`.
///
/// # Errors
/// Returns [`RepoError::HomeDirectoryUnavailable`] when neither is available.
pub fn resolve_root(override_root: Option<OsString>, home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(root) = override_root.filter(|r| !r.is_empty()) {
        return Ok(PathBuf::from(root));
    }
    home.map(|home| home.join(".local").join("src"))
        .ok_or(RepoError::HomeDirectoryUnavailable)
}
