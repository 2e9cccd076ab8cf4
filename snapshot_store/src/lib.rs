//! Commit snapshot store built on `git2` (libgit2).
//!
//! Keeps one persistent clone per repository key under
//! `<base_dir>/clones/<key>` and materializes immutable working trees for
//! specific commits under `<base_dir>/snapshots/<key>/<sha>`. A snapshot
//! directory that already exists is reused as-is: commits are immutable,
//! so the checkout never goes stale.
//!
//! - Blocking libgit2 work runs inside `spawn_blocking`.
//! - SSH auth: `SSH_KEY_PATH` (private key) or ssh-agent fallback.
//! - HTTPS auth: `GIT_HTTP_TOKEN` (+ `GIT_HTTP_USER`, default `oauth2`).

use std::{
    fs,
    path::{Path, PathBuf},
};

use git2::{
    Cred, CredentialType, ErrorCode, FetchOptions, Oid, RemoteCallbacks, Repository,
    build::{CheckoutBuilder, RepoBuilder},
};
use tokio::task;
use tracing::{debug, info, instrument, warn};

pub mod errors;
use errors::{Result, SnapshotError};

/// Resolves `(repository_key, commit_sha)` pairs to checked-out snapshot
/// directories on local disk.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    base_dir: PathBuf,
    /// Remote URL prefix, joined with the repository key and `.git`
    /// (e.g. `https://git.example.com` + `org/repo`).
    remote_base: String,
}

impl SnapshotStore {
    pub fn new(base_dir: impl Into<PathBuf>, remote_base: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            remote_base: remote_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Local clone directory for a repository key, whether or not it
    /// exists yet.
    pub fn clone_dir(&self, repository_key: &str) -> PathBuf {
        self.base_dir.join("clones").join(repository_key)
    }

    fn snapshot_dir(&self, repository_key: &str, commit_sha: &str) -> PathBuf {
        self.base_dir
            .join("snapshots")
            .join(repository_key)
            .join(commit_sha)
    }

    fn remote_url(&self, repository_key: &str) -> String {
        format!("{}/{}.git", self.remote_base, repository_key)
    }

    /// Materialize the working tree of `commit_sha` and return its
    /// directory. Clones the repository on first use, refreshes from the
    /// remote when the commit is not yet known locally, and fails with
    /// [`SnapshotError::MissingCommit`] when it cannot be found at all.
    #[instrument(skip(self), fields(repo = %repository_key, sha = %commit_sha))]
    pub async fn materialize(&self, repository_key: &str, commit_sha: &str) -> Result<PathBuf> {
        let store = self.clone();
        let key = repository_key.to_string();
        let sha = commit_sha.to_string();
        task::spawn_blocking(move || store.materialize_blocking(&key, &sha)).await?
    }

    fn materialize_blocking(&self, repository_key: &str, commit_sha: &str) -> Result<PathBuf> {
        let snapshot = self.snapshot_dir(repository_key, commit_sha);
        if snapshot.join(".snapshot-complete").exists() {
            debug!("snapshot_store: reuse {}", snapshot.display());
            return Ok(snapshot);
        }

        let repo = self.open_or_clone(repository_key)?;
        let commit = self.resolve_commit(&repo, repository_key, commit_sha)?;

        if snapshot.exists() {
            // Interrupted previous checkout; start it over.
            warn!("snapshot_store: clearing partial {}", snapshot.display());
            fs::remove_dir_all(&snapshot)?;
        }
        fs::create_dir_all(&snapshot)?;

        let mut checkout = CheckoutBuilder::new();
        checkout.target_dir(&snapshot).force().recreate_missing(true);
        repo.checkout_tree(commit.as_object(), Some(&mut checkout))?;
        fs::write(snapshot.join(".snapshot-complete"), commit_sha)?;

        info!("snapshot_store: materialized -> {}", snapshot.display());
        Ok(snapshot)
    }

    fn open_or_clone(&self, repository_key: &str) -> Result<Repository> {
        let dir = self.clone_dir(repository_key);
        if dir.exists() {
            match Repository::open(&dir) {
                Ok(repo) => return Ok(repo),
                Err(err) => {
                    warn!(
                        "snapshot_store: unusable clone at {}: {err}",
                        dir.display()
                    );
                    fs::remove_dir_all(&dir)?;
                }
            }
        }
        if let Some(parent) = dir.parent() {
            fs::create_dir_all(parent)?;
        }

        let url = self.remote_url(repository_key);
        info!("snapshot_store: clone {url} -> {}", dir.display());

        let mut fetch_opts = FetchOptions::new();
        fetch_opts.remote_callbacks(credential_callbacks());

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_opts);
        Ok(builder.clone(&url, &dir)?)
    }

    fn resolve_commit<'r>(
        &self,
        repo: &'r Repository,
        repository_key: &str,
        commit_sha: &str,
    ) -> Result<git2::Commit<'r>> {
        let missing = || SnapshotError::MissingCommit {
            repository_key: repository_key.to_string(),
            commit_sha: commit_sha.to_string(),
        };

        let oid = Oid::from_str(commit_sha).map_err(|_| missing())?;
        match repo.find_commit(oid) {
            Ok(commit) => Ok(commit),
            Err(err) if err.code() == ErrorCode::NotFound => {
                // The clone may predate the commit; refresh and retry once.
                debug!("snapshot_store: {commit_sha} not local, fetching");
                self.fetch_origin(repo)?;
                repo.find_commit(oid).map_err(|err| {
                    if err.code() == ErrorCode::NotFound {
                        missing()
                    } else {
                        err.into()
                    }
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn fetch_origin(&self, repo: &Repository) -> Result<()> {
        let mut remote = match repo.find_remote("origin") {
            Ok(remote) => remote,
            // Local test repositories have no remote; nothing to refresh.
            Err(err) if err.code() == ErrorCode::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        };
        let mut fetch_opts = FetchOptions::new();
        fetch_opts.remote_callbacks(credential_callbacks());
        remote.fetch(&[] as &[&str], Some(&mut fetch_opts), None)?;
        Ok(())
    }
}

/// libgit2 credential callbacks: HTTPS token from env, explicit SSH key
/// path, ssh-agent, then libgit2 defaults.
fn credential_callbacks() -> RemoteCallbacks<'static> {
    let key_path_env = std::env::var("SSH_KEY_PATH").ok();

    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |url_str, username_from_url, allowed| {
        let user = username_from_url.unwrap_or("git");

        if url_str.starts_with("http") {
            if let Ok(token) = std::env::var("GIT_HTTP_TOKEN") {
                let http_user = std::env::var("GIT_HTTP_USER").unwrap_or_else(|_| "oauth2".into());
                return Cred::userpass_plaintext(&http_user, &token);
            }
        }

        if allowed.contains(CredentialType::SSH_KEY) {
            if let Some(ref key) = key_path_env {
                let key_path = Path::new(key);
                if key_path.exists() {
                    let pass = std::env::var("SSH_KEY_PASSPHRASE").ok();
                    return Cred::ssh_key(user, None, key_path, pass.as_deref());
                }
            }
            if let Ok(cred) = Cred::ssh_key_from_agent(user) {
                return Ok(cred);
            }
        }

        if allowed.contains(CredentialType::DEFAULT) {
            if let Ok(cred) = Cred::default() {
                return Ok(cred);
            }
        }

        if allowed.contains(CredentialType::USERNAME) {
            return Cred::username(user);
        }

        Err(git2::Error::from_str("no usable credentials"))
    });
    callbacks
}
