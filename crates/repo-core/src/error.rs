//! Error types for locating and cloning repositories.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while mapping a remote URL to a local clone.
#[derive(Error, Debug)]
pub enum RepoError {
    /// No local path could be derived from the URL.
    #[error("failed to derive path from url: {url}{}", reason_suffix(.reason))]
    Derivation {
        /// The offending URL.
        url: String,
        /// Extra detail, if any.
        reason: Option<String>,
    },

    /// The clone destination exists but is not a directory.
    #[error("'{}' exists and is not a directory", .path.display())]
    Conflict {
        /// Destination path.
        path: PathBuf,
    },

    /// A path that must be a directory is something else.
    #[error("mkdir {}: not a directory", .path.display())]
    NotADirectory {
        /// Offending path.
        path: PathBuf,
    },

    /// Creating a directory failed.
    #[error("could not create repo directory {}", .path.display())]
    DirectoryCreation {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Removing an existing clone before re-cloning failed.
    #[error("could not remove directory '{}'", .path.display())]
    RemoveFailed {
        /// Directory that could not be removed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// An external command failed to start or exited unsuccessfully.
    #[error("command '{command}' failed: {message}")]
    Command {
        /// Command that failed.
        command: String,
        /// Error message.
        message: String,
        /// Exit code if available.
        exit_code: Option<i32>,
    },

    /// The external clone failed.
    #[error("could not clone repository {url}: {reason}")]
    CloneFailed {
        /// Clone source.
        url: String,
        /// Failure reason.
        reason: String,
    },

    /// No root prefix override and no home directory.
    #[error("could not get home directory")]
    HomeDirectoryUnavailable,

    /// The probe HTTP client could not be built.
    #[error("http client error: {message}")]
    HttpClient {
        /// Error message.
        message: String,
    },

    /// The invocation was cancelled before it completed.
    #[error("operation cancelled")]
    Cancelled,
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" ({r})"))
        .unwrap_or_default()
}

impl RepoError {
    /// Create a derivation error without further detail.
    #[must_use]
    pub fn derivation(url: impl Into<String>) -> Self {
        Self::Derivation {
            url: url.into(),
            reason: None,
        }
    }

    /// Create a clone failed error.
    #[must_use]
    pub fn clone_failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CloneFailed {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error is a cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepoError>;
