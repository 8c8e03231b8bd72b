//! Clone orchestration: derive a local path, reuse or provision it, clone.

use crate::cleanup::CleanupStack;
use crate::client::{GitCli, VcsClient};
use crate::config::Config;
use crate::error::{RepoError, Result};
use crate::provision::{self, DIR_MODE, ProvisionRecord};
use crate::redirect::RedirectResolver;
use crate::remote::{PathSegments, RemoteUrl};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Maps remote URLs to local paths and clones them on demand.
#[derive(Debug)]
pub struct Cloner<C = GitCli> {
    client: C,
    resolver: Option<RedirectResolver>,
    cancel: CancellationToken,
}

impl Cloner<GitCli> {
    /// Build a cloner backed by `git`, configured from `config`.
    ///
    /// # Errors
    /// Returns error if the redirect probe client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let resolver = config
            .probe_timeout
            .map(RedirectResolver::new)
            .transpose()?;
        Ok(Self::new(GitCli::new().with_echo(config.verbose)).with_resolver(resolver))
    }
}

impl<C: VcsClient> Cloner<C> {
    /// Create a cloner around `client` without redirect probing.
    #[must_use]
    pub fn new(client: C) -> Self {
        Self {
            client,
            resolver: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Set the redirect resolver; `None` clones from the URL as given.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Option<RedirectResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Stop in-flight work and roll back when `cancel` fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The underlying client.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// Return the local path for `url` under `root`, cloning it if missing.
    ///
    /// An existing directory is reused without cloning unless `force` is
    /// set, in which case it is deleted and cloned again. Directories created
    /// on the way are removed again if the clone fails or is cancelled. The
    /// destination itself is only removed if this call created it; one that
    /// appeared concurrently is left alone.
    ///
    /// # Errors
    /// - [`RepoError::Derivation`] if no path can be derived from `url`
    /// - [`RepoError::Conflict`] if the destination exists as a non-directory
    /// - [`RepoError::NotADirectory`] or [`RepoError::DirectoryCreation`]
    ///   if the parent directories cannot be provisioned
    /// - [`RepoError::CloneFailed`] if the client fails
    /// - [`RepoError::Cancelled`] if cancelled before the clone completed
    pub async fn clone(&self, root: &Path, url: &str, force: bool) -> Result<PathBuf> {
        let segments = PathSegments::from_url(url)?;
        let full_path = segments.join_onto(root);
        let dir_path = full_path
            .parent()
            .map_or_else(|| root.to_path_buf(), Path::to_path_buf);

        match fs::metadata(&full_path) {
            Ok(meta) if !meta.is_dir() => {
                return Err(RepoError::Conflict { path: full_path });
            }
            Ok(_) if !force => {
                debug!(path = ?full_path, "reusing existing clone");
                return Ok(full_path);
            }
            Ok(_) => {
                info!(path = ?full_path, "removing existing clone");
                fs::remove_dir_all(&full_path).map_err(|source| RepoError::RemoveFailed {
                    path: full_path.clone(),
                    source,
                })?;
            }
            // Anything else surfaces while provisioning or cloning
            Err(e) => debug!(path = ?full_path, error = %e, "destination not found"),
        }

        let mut cleanup = CleanupStack::new();
        let mut record = ProvisionRecord::new();
        let provisioned = provision::ensure_into(&dir_path, DIR_MODE, &mut record);
        cleanup.defer("remove provisioned directories", move || record.rollback());
        provisioned?;

        let source = self.resolve(url).await?;

        // Only a destination created here may be removed recursively
        let mut claimed = ProvisionRecord::new();
        let claim = provision::ensure_into(&full_path, DIR_MODE, &mut claimed);
        if !claimed.is_empty() {
            let destination = full_path.clone();
            cleanup.defer("remove partial clone", move || remove_partial(&destination));
        }
        claim?;

        info!(source = %source, path = ?full_path, "cloning repository");

        match self.client.clone_repo(&source, &full_path, &self.cancel).await {
            Ok(()) => {
                cleanup.dismiss();
                Ok(full_path)
            }
            Err(e) => {
                cleanup.run();
                if e.is_cancelled() {
                    Err(e)
                } else {
                    Err(RepoError::clone_failed(source, e.to_string()))
                }
            }
        }
    }

    async fn resolve(&self, url: &str) -> Result<String> {
        let Some(resolver) = &self.resolver else {
            return Ok(RemoteUrl::split(url).merge());
        };
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(RepoError::Cancelled),
            source = resolver.resolve(url) => Ok(source),
        }
    }
}

fn remove_partial(path: &Path) {
    match fs::remove_dir_all(path) {
        Ok(()) => debug!(path = ?path, "removed partial clone"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = ?path, error = %e, "could not remove partial clone"),
    }
}
