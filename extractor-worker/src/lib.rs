//! Extraction worker harness.
//!
//! Accepts one [`ParseArgs`] request at a time, resolves the project
//! directory (materializing a commit snapshot when the request names one),
//! runs the extraction pipeline on the blocking pool, and classifies the
//! outcome for the caller:
//!
//! - success — `Ok(Some(map))` of feature category to artifact path;
//! - cancellation — `Ok(None)`, an expected outcome, not an error;
//! - missing commit — `Err(WorkerError::MissingCommit)`, the only error
//!   the caller is expected to branch on;
//! - anything else — logged here, reported as `Ok(None)`; the run is
//!   discarded and no partial artifact map is returned.
//!
//! Cancellation is delivered through a oneshot [`CancelHandle`]; the
//! harness bridges it onto the run's shared [`CancelFlag`], which the
//! traversal polls per node.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use extractor_core::context::{CancelFlag, ParseContext};
use extractor_core::errors::ExtractError;
use extractor_core::frontend::ts::{TsFrontend, TsTypeFacility};
use extractor_core::run::extract_features;
use extractor_core::visitors::default_registry;
use serde::{Deserialize, Serialize};
use snapshot_store::{SnapshotStore, errors::SnapshotError};
use tokio::sync::oneshot;
use tokio::task;
use tracing::{error, info, instrument, warn};

pub mod errors;
use errors::WorkerError;

/// One extraction request, as received from the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseArgs {
    /// Opaque id threading this request through logs and artifacts.
    pub correlation_id: String,
    /// Directory feature artifacts are written into.
    pub output_directory_path: PathBuf,
    /// Repository to extract from, as `org/name`.
    #[serde(default)]
    pub repository_key: Option<String>,
    /// Commit to materialize before extraction.
    #[serde(default)]
    pub commit_sha: Option<String>,
    /// Pre-resolved local project directory, bypassing the snapshot store.
    #[serde(default)]
    pub directory_path: Option<PathBuf>,
    #[serde(default)]
    pub compress_output: bool,
}

/// Reply for one request: `Some(map)` of feature name to artifact path on
/// success, `None` when the run produced nothing (cancelled or failed).
pub type WorkerReply = Result<Option<BTreeMap<String, String>>, WorkerError>;

/// One-shot cancellation handle for a submitted request. Dropping it
/// without calling [`CancelHandle::cancel`] lets the run finish normally.
pub struct CancelHandle(oneshot::Sender<()>);

impl CancelHandle {
    pub fn cancel(self) {
        // A reply that already completed simply ignores the signal.
        let _ = self.0.send(());
    }
}

/// The worker: owns the snapshot store and runs one request per call.
#[derive(Clone)]
pub struct ExtractionWorker {
    store: SnapshotStore,
}

impl ExtractionWorker {
    pub fn new(store: SnapshotStore) -> Self {
        Self { store }
    }

    /// Submit a request for background execution. Returns the cancel
    /// handle and the join handle carrying the classified reply.
    pub fn submit(&self, args: ParseArgs) -> (CancelHandle, task::JoinHandle<WorkerReply>) {
        let (tx, rx) = oneshot::channel();
        let cancel = CancelFlag::new();

        let bridge = cancel.clone();
        tokio::spawn(async move {
            if rx.await.is_ok() {
                bridge.cancel();
            }
        });

        let worker = self.clone();
        let handle = tokio::spawn(async move { worker.run(args, cancel).await });
        (CancelHandle(tx), handle)
    }

    /// Execute one request to completion with the given cancel flag.
    #[instrument(skip_all, fields(correlation_id = %args.correlation_id))]
    pub async fn run(&self, args: ParseArgs, cancel: CancelFlag) -> WorkerReply {
        let directory = match self.resolve_directory(&args).await {
            Ok(Some(dir)) => dir,
            Ok(None) => return Ok(None),
            Err(err) => return Err(err),
        };

        let mut ctx = ParseContext::new(
            args.correlation_id.clone(),
            directory,
            args.output_directory_path.clone(),
            args.compress_output,
            cancel,
        );

        let result = task::spawn_blocking(move || {
            let mut visitors = default_registry(Arc::new(TsTypeFacility));
            extract_features(&mut ctx, &TsFrontend, &mut visitors)
        })
        .await;

        match result {
            Ok(Ok(written)) => {
                info!("worker: extraction done, {} artifacts", written.len());
                Ok(Some(written))
            }
            Ok(Err(ExtractError::Cancelled)) => {
                info!("worker: extraction cancelled");
                Ok(None)
            }
            Ok(Err(err)) => {
                error!("worker: extraction failed: {err}");
                Ok(None)
            }
            Err(join_err) => {
                error!("worker: extraction task panicked: {join_err}");
                Ok(None)
            }
        }
    }

    /// Resolve the project directory for a request, in fixed precedence:
    /// commit snapshot, explicit local directory, cached clone.
    async fn resolve_directory(&self, args: &ParseArgs) -> Result<Option<PathBuf>, WorkerError> {
        if let (Some(key), Some(sha)) = (&args.repository_key, &args.commit_sha) {
            return match self.store.materialize(key, sha).await {
                Ok(dir) => Ok(Some(dir)),
                Err(SnapshotError::MissingCommit {
                    repository_key,
                    commit_sha,
                }) => Err(WorkerError::MissingCommit {
                    repository_key,
                    commit_sha,
                }),
                Err(err) => {
                    error!("worker: snapshot materialization failed: {err}");
                    Ok(None)
                }
            };
        }

        if let Some(dir) = &args.directory_path {
            return Ok(Some(dir.clone()));
        }

        if let Some(key) = &args.repository_key {
            let dir = self.store.clone_dir(key);
            if dir.exists() {
                return Ok(Some(dir));
            }
            warn!("worker: no cached clone for {key}");
            return Ok(None);
        }

        warn!("worker: request names neither a repository nor a directory");
        Ok(None)
    }
}
