use std::error::Error;
use std::path::PathBuf;

use extractor_worker::{ExtractionWorker, ParseArgs};
use snapshot_store::SnapshotStore;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Optional .env; absence is fine outside local development.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,extractor_core=info"))?;
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let base_dir = env_or("SNAPSHOT_BASE_DIR", "snapshot_data");
    let remote_base = env_or("GIT_REMOTE_BASE", "https://github.com");
    let worker = ExtractionWorker::new(SnapshotStore::new(base_dir, remote_base));

    let args = ParseArgs {
        correlation_id: env_or("EXTRACT_CORRELATION_ID", "local-run"),
        output_directory_path: PathBuf::from(env_or("EXTRACT_OUTPUT_DIR", "extract_output")),
        repository_key: std::env::var("EXTRACT_REPOSITORY_KEY").ok(),
        commit_sha: std::env::var("EXTRACT_COMMIT_SHA").ok(),
        directory_path: std::env::var("EXTRACT_DIRECTORY").ok().map(PathBuf::from),
        compress_output: std::env::var("EXTRACT_COMPRESS")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false),
    };

    let (_cancel, reply) = worker.submit(args);
    match reply.await? {
        Ok(Some(written)) => {
            for (name, path) in &written {
                info!("main: {name} -> {path}");
            }
        }
        Ok(None) => info!("main: run produced no artifacts"),
        Err(err) => return Err(err.into()),
    }

    Ok(())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
