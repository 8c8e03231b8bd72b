//! Command-line arguments.

use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use repo_core::config::PROBE_TIMEOUT_ENV;
use repo_core::redirect::DEFAULT_PROBE_TIMEOUT;
use std::process::ExitCode;

/// Print the local path of a remote repository, cloning it first if needed.
///
/// Repositories live under $REPOPREFIX (default: ~/.local/src), at
/// <host>/<path>. Standard output carries only the resolved path.
#[derive(Parser, Debug)]
#[command(name = "repo", disable_version_flag = true)]
pub struct Cli {
    /// Delete and re-clone the repository
    #[arg(short, long)]
    pub force: bool,

    /// Print version and exit
    #[arg(short = 'V', long)]
    pub version: bool,

    /// Increase log verbosity: -v info, -vv debug, -vvv trace
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Seconds to wait for the moved-repository probe (0 disables it)
    #[arg(
        long,
        value_name = "SECONDS",
        env = PROBE_TIMEOUT_ENV,
        default_value_t = DEFAULT_PROBE_TIMEOUT.as_secs()
    )]
    pub probe_timeout: u64,

    /// Remote repository URL
    #[arg(value_name = "URL", required_unless_present = "version")]
    pub url: Option<String>,
}

impl Cli {
    /// The URL, or a usage error if it is missing.
    pub fn url(&self) -> Result<&str, clap::Error> {
        self.url.as_deref().ok_or_else(|| {
            Self::command().error(ErrorKind::MissingRequiredArgument, "no URL given")
        })
    }
}

/// Print a parse error (or help) to stderr and pick the exit code.
///
/// Help is rendered to stderr as well, since stdout is reserved for the path.
pub fn report(err: &clap::Error) -> ExitCode {
    eprint!("{}", err.render());
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags_and_url() {
        let cli = Cli::try_parse_from(["repo", "-f", "-vv", "git@example.com:foo/bar"]).unwrap();
        assert!(cli.force);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.url().unwrap(), "git@example.com:foo/bar");
    }

    #[test]
    fn version_does_not_need_url() {
        let cli = Cli::try_parse_from(["repo", "--version"]).unwrap();
        assert!(cli.version);
        assert!(cli.url().is_err());
    }

    #[test]
    fn url_is_required() {
        let err = Cli::try_parse_from(["repo"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn probe_timeout_flag() {
        let cli = Cli::try_parse_from(["repo", "--probe-timeout", "0", "example.com/foo"]).unwrap();
        assert_eq!(cli.probe_timeout, 0);
    }
}
