//! External version-control client.
//!
//! The clone itself is always delegated to a client binary; this crate never
//! speaks a VCS wire protocol.

use crate::error::{RepoError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// A client able to clone a repository to a local path.
#[async_trait]
pub trait VcsClient: Send + Sync {
    /// Clone `source` into `destination`.
    ///
    /// Implementations must stop and return [`RepoError::Cancelled`] once
    /// `cancel` fires, after any child process has exited.
    async fn clone_repo(
        &self,
        source: &str,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<()>;
}

/// The `git` command-line client.
///
/// Standard input is inherited. Both output streams of the child go to this
/// process's standard error, since standard output is reserved for the
/// resolved path.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: OsString,
    echo: bool,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    /// Use `git` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: OsString::from("git"),
            echo: false,
        }
    }

    /// Use a different client binary.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Print the exact invocation to standard error before running it.
    #[must_use]
    pub const fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    fn args<'a>(&'a self, source: &'a str, destination: &'a Path) -> Vec<&'a std::ffi::OsStr> {
        vec![
            self.program.as_os_str(),
            "clone".as_ref(),
            source.as_ref(),
            destination.as_os_str(),
        ]
    }

    fn command_name(&self) -> String {
        format!("{} clone", self.program.to_string_lossy())
    }
}

#[async_trait]
impl VcsClient for GitCli {
    async fn clone_repo(
        &self,
        source: &str,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let argv = self.args(source, destination);
        if self.echo {
            eprintln!("{argv:?}");
        }

        let mut cmd = Command::new(argv[0]);
        cmd.args(&argv[1..])
            .stdin(Stdio::inherit())
            .stdout(std::io::stderr())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        trace!(command = ?cmd, "executing git clone");

        let mut child = cmd.spawn().map_err(|e| RepoError::Command {
            command: self.command_name(),
            message: e.to_string(),
            exit_code: None,
        })?;

        let waited = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("clone cancelled, stopping client");
                if let Err(e) = child.start_kill() {
                    warn!(error = %e, "could not signal clone process");
                }
                if let Err(e) = child.wait().await {
                    warn!(error = %e, "could not reap clone process");
                }
                return Err(RepoError::Cancelled);
            }
            status = child.wait() => status,
        };
        let status = waited.map_err(|e| RepoError::Command {
            command: self.command_name(),
            message: e.to_string(),
            exit_code: None,
        })?;

        if !status.success() {
            return Err(RepoError::Command {
                command: self.command_name(),
                message: status.to_string(),
                exit_code: status.code(),
            });
        }

        debug!(source, destination = ?destination, "git clone complete");
        Ok(())
    }
}
