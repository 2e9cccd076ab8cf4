use thiserror::Error;

/// The only error that crosses the worker boundary. Everything else an
/// extraction run can fail with is either expected (cancellation) or
/// terminal for the run, and both are reported as an empty reply.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkerError {
    #[error("commit {commit_sha} not found in repository {repository_key}")]
    MissingCommit {
        repository_key: String,
        commit_sha: String,
    },
}
