//! Repository snapshot acquisition and release

use async_trait::async_trait;
use git2::build::RepoBuilder;
use git2::{Cred, FetchOptions, RemoteCallbacks};
use repoindex_core::error::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// A local copy of a repository at one branch, owned by a single run
///
/// Snapshots created in a temporary directory remove that directory when dropped, so a
/// run that is cancelled midway still releases its disk space.
#[derive(Debug)]
pub struct RepoSnapshot {
    root: PathBuf,
    guard: Option<TempDir>,
}

impl RepoSnapshot {
    /// A snapshot living at `root` inside a temporary directory owned by the snapshot
    pub fn owned(dir: TempDir, root: PathBuf) -> Self {
        Self {
            root,
            guard: Some(dir),
        }
    }

    /// A snapshot of an existing directory that must not be deleted
    pub fn borrowed(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            guard: None,
        }
    }

    /// Root directory of the checked-out files
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Delete the snapshot's temporary directory, if it owns one
    pub fn release(self) -> Result<()> {
        match self.guard {
            Some(dir) => {
                let path = dir.path().to_path_buf();
                dir.close().map_err(|e| {
                    Error::cleanup(format!("Failed to remove {}: {e}", path.display()))
                })?;
                debug!("Removed snapshot directory {}", path.display());
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Fetches and releases repository snapshots
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Materialize `owner/repo` at `branch` in a location no other run uses
    async fn fetch(&self, owner: &str, repo: &str, branch: &str) -> Result<RepoSnapshot>;

    /// Release a snapshot obtained from [`RepositorySource::fetch`]
    async fn cleanup(&self, snapshot: RepoSnapshot) -> Result<()>;
}

/// Shallow git clones over HTTPS with token authentication
pub struct GitRepositorySource {
    base_url: String,
    token: String,
}

impl GitRepositorySource {
    /// Create a source cloning from `base_url` (e.g. `https://github.com`)
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn clone_url(&self, owner: &str, repo: &str) -> String {
        format!(
            "{}/{owner}/{repo}.git",
            self.base_url.trim_end_matches('/')
        )
    }
}

impl std::fmt::Debug for GitRepositorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepositorySource")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Clone `url` at `branch` with depth 1 into `dest`
fn shallow_clone(url: &str, branch: &str, token: &str, dest: &Path) -> Result<()> {
    let mut callbacks = RemoteCallbacks::new();
    let token = token.to_string();
    // libgit2 keeps asking while the server rejects credentials
    let mut attempted = false;
    callbacks.credentials(move |_url, _username, _allowed| {
        if attempted {
            return Err(git2::Error::from_str("Repository credentials were rejected"));
        }
        attempted = true;
        Cred::userpass_plaintext("x-access-token", &token)
    });

    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);
    fetch_options.depth(1);

    RepoBuilder::new()
        .branch(branch)
        .fetch_options(fetch_options)
        .clone(url, dest)
        .map_err(|e| Error::fetch(format!("Failed to clone {url} at branch {branch}: {e}")))?;

    Ok(())
}

#[async_trait]
impl RepositorySource for GitRepositorySource {
    async fn fetch(&self, owner: &str, repo: &str, branch: &str) -> Result<RepoSnapshot> {
        let url = self.clone_url(owner, repo);

        let dir = tempfile::Builder::new()
            .prefix(&format!("{owner}_{repo}_"))
            .tempdir()
            .map_err(|e| Error::fetch(format!("Failed to create snapshot directory: {e}")))?;
        let dest = dir.path().join(repo);

        info!("Cloning {owner}/{repo}@{branch} into {}", dest.display());

        // The directory belongs to the clone task until the clone returns
        let token = self.token.clone();
        let branch = branch.to_string();
        let clone_dest = dest.clone();
        let dir = tokio::task::spawn_blocking(move || {
            shallow_clone(&url, &branch, &token, &clone_dest).map(|()| dir)
        })
        .await
        .map_err(|e| Error::fetch(format!("Clone task failed: {e}")))??;

        Ok(RepoSnapshot::owned(dir, dest))
    }

    async fn cleanup(&self, snapshot: RepoSnapshot) -> Result<()> {
        tokio::task::spawn_blocking(move || snapshot.release())
            .await
            .map_err(|e| Error::cleanup(format!("Cleanup task failed: {e}")))?
    }
}
