//! Deterministic local paths for remote repositories.
//!
//! Given a git-style remote URL, this crate answers "where on disk is this
//! repository", cloning it first if necessary:
//!
//! - **Normalization**: scheme URLs, scp shorthand, credentials, query
//!   strings and `.git` suffixes all map onto `<root>/<host>/<path...>`
//! - **Reuse**: an existing clone is returned as-is
//! - **Redirects**: a moved repository host is detected before cloning
//! - **Rollback**: directories created for a failed or cancelled clone are
//!   removed again, deepest first
//!
//! The clone itself is delegated to an external client (`git` by default).
//!
//! # Quick Start
//!
//! ```no_run
//! use repo_core::{Cloner, Config};
//!
//! # async fn run() -> repo_core::Result<()> {
//! let config = Config::from_env()?;
//! let cloner = Cloner::from_config(&config)?;
//!
//! let path = cloner
//!     .clone(config.root(), "git@github.com:rust-lang/cargo.git", false)
//!     .await?;
//! println!("{}", path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Module Structure
//!
//! - [`remote`]: URL splitting, merging and path derivation
//! - [`redirect`]: moved-host detection
//! - [`provision`]: directory creation with rollback records
//! - [`cleanup`]: deferred cleanup actions
//! - [`client`]: the external VCS client
//! - [`clone`]: the orchestrator
//! - [`config`]: invocation configuration
//! - [`error`]: error types

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cleanup;
pub mod client;
pub mod clone;
pub mod config;
pub mod error;
pub mod provision;
pub mod redirect;
pub mod remote;

pub use cleanup::CleanupStack;
pub use client::{GitCli, VcsClient};
pub use clone::Cloner;
pub use config::Config;
pub use error::{RepoError, Result};
pub use provision::{ProvisionRecord, ensure};
pub use redirect::RedirectResolver;
pub use remote::{PathSegments, RemoteUrl, to_segments};
pub use tokio_util::sync::CancellationToken;
