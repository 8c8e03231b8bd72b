//! `repo`: print where a remote repository lives on disk, cloning it first
//! if it is not there yet.
//!
//! Standard output carries exactly one line, the resolved path, and only on
//! success. Diagnostics, usage text and the output of `git` itself all go to
//! standard error, so `cd "$(repo URL)"` composes safely.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use repo_core::{CancellationToken, Cloner, Config};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::task::JoinHandle;
use tracing::{Level, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return cli::report(&e),
    };

    if cli.version {
        eprintln!("repo {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let url = match cli.url() {
        Ok(url) => url.to_string(),
        Err(e) => return cli::report(&e),
    };

    init_tracing(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to create runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(&cli, &url)) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", render_error(&e));
            ExitCode::FAILURE
        }
    }
}

/// One line: the error followed by its causes.
fn render_error(err: &anyhow::Error) -> String {
    format!("{err:#}")
}

fn init_tracing(verbose: u8) {
    let log_level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

async fn run(cli: &Cli, url: &str) -> anyhow::Result<PathBuf> {
    let config = Config::from_env()?.with_probe_timeout_secs(cli.probe_timeout);
    let cancel = CancellationToken::new();
    let cloner = Cloner::from_config(&config)
        .context("failed to initialize")?
        .with_cancellation(cancel.clone());

    let signals = spawn_signal_listener(cancel).context("failed to install signal handlers")?;

    let result = cloner.clone(config.root(), url, cli.force).await;
    signals.abort();
    Ok(result?)
}

/// Cancel the in-flight invocation on SIGINT or SIGTERM.
///
/// Handlers are installed before returning, so a signal arriving while
/// directories are being provisioned still goes through rollback.
#[cfg(unix)]
fn spawn_signal_listener(cancel: CancellationToken) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    Ok(tokio::spawn(async move {
        tokio::select! {
            Some(()) = interrupt.recv() => {}
            Some(()) = terminate.recv() => {}
            else => return,
        }
        warn!("interrupted, rolling back");
        cancel.cancel();
    }))
}

#[cfg(not(unix))]
fn spawn_signal_listener(cancel: CancellationToken) -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, rolling back");
            cancel.cancel();
        }
    }))
}
