//! Shared fixtures for repo-core integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use repo_core::{CancellationToken, RepoError, Result, VcsClient};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use walkdir::WalkDir;

/// What the stub client does when asked to clone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Create the destination with a `.git` directory.
    Succeed,
    /// Leave a partial destination behind and fail.
    Fail,
    /// Block until cancelled.
    Hang,
}

/// A client that records every invocation instead of cloning.
#[derive(Debug)]
pub struct RecordingClient {
    behavior: Behavior,
    calls: Mutex<Vec<(String, PathBuf)>>,
}

impl RecordingClient {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VcsClient for RecordingClient {
    async fn clone_repo(
        &self,
        source: &str,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((source.to_string(), destination.to_path_buf()));

        match self.behavior {
            Behavior::Succeed => {
                fs::create_dir_all(destination.join(".git")).unwrap();
                Ok(())
            }
            Behavior::Fail => {
                fs::create_dir_all(destination.join(".git/objects")).unwrap();
                Err(RepoError::Command {
                    command: "git clone".into(),
                    message: "exit status: 128".into(),
                    exit_code: Some(128),
                })
            }
            Behavior::Hang => {
                fs::create_dir_all(destination.join(".git")).unwrap();
                cancel.cancelled().await;
                Err(RepoError::Cancelled)
            }
        }
    }
}

/// Every entry under `root`, relative to it, sorted.
pub fn snapshot(root: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|e| e.unwrap().path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    entries.sort();
    entries
}
