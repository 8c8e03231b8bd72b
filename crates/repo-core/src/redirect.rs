//! Best-effort detection of moved repositories.
//!
//! Before cloning, the remote's host and path are probed over HTTPS. If the
//! probe lands on a different host after following redirects, the clone
//! source is rewritten to the new location. Same-host redirects are ignored:
//! they usually point at a login page of a private server, and most hosts
//! handle moved repositories themselves during a clone.

use crate::error::{RepoError, Result};
use crate::remote::RemoteUrl;
use reqwest::{Client, redirect::Policy};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Default upper bound for one probe, redirects included.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_REDIRECTS: usize = 10;

/// Probes a remote over HTTP(S) and follows host moves.
#[derive(Debug, Clone)]
pub struct RedirectResolver {
    client: Client,
    scheme: String,
}

impl RedirectResolver {
    /// Create a resolver whose probes give up after `timeout`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .use_rustls_tls()
            .build()
            .map_err(|e| RepoError::HttpClient {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            scheme: "https".to_string(),
        })
    }

    /// Probe with a scheme other than `https`.
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Resolve `url` to the location the clone should use.
    ///
    /// Never fails: when the probe errors or does not succeed, the input is
    /// returned in its merged form.
    pub async fn resolve(&self, url: &str) -> String {
        let mut remote = RemoteUrl::split(url);
        let probe = format!("{}://{}", self.scheme, remote.path);

        let response = match self.client.get(&probe).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(probe, error = %e, "redirect probe failed");
                return remote.merge();
            }
        };

        if !response.status().is_success() {
            debug!(probe, status = %response.status(), "redirect probe unsuccessful");
            return remote.merge();
        }

        if let Some(moved) = moved_location(remote.host(), response.url()) {
            info!(from = %remote.path, to = %moved, "repository moved");
            remote.path = moved;
        }
        remote.merge()
    }
}

/// Host and path of `resolved` if it lives on a host other than `host`.
fn moved_location(host: &str, resolved: &Url) -> Option<String> {
    let authority = authority(resolved);
    if authority == host {
        return None;
    }
    Some(format!("{authority}{}", resolved.path()))
}

fn authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_host_is_not_a_move() {
        let resolved = Url::parse("https://example.com/login?next=/foo").unwrap();
        assert_eq!(moved_location("example.com", &resolved), None);
    }

    #[test]
    fn other_host_is_a_move() {
        let resolved = Url::parse("https://new.example.org/team/foo").unwrap();
        assert_eq!(
            moved_location("example.com", &resolved).as_deref(),
            Some("new.example.org/team/foo")
        );
    }

    #[test]
    fn port_is_part_of_the_host() {
        let resolved = Url::parse("http://127.0.0.1:8080/foo").unwrap();
        assert_eq!(moved_location("127.0.0.1:8080", &resolved), None);
        assert!(moved_location("127.0.0.1:9090", &resolved).is_some());
    }
}
