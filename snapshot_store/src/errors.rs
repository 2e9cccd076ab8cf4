use thiserror::Error;

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The requested commit does not exist in the repository, even after a
    /// refresh from the remote. The only variant callers are expected to
    /// branch on.
    #[error("commit {commit_sha} not found in repository {repository_key}")]
    MissingCommit {
        repository_key: String,
        commit_sha: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("git error: {0}")]
    Git(#[from] git2::Error),
}
