//! End-to-end harness tests: a real fixture project on disk, through the
//! worker, down to artifact files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use extractor_core::context::CancelFlag;
use extractor_worker::errors::WorkerError;
use extractor_worker::{ExtractionWorker, ParseArgs};
use flate2::read::GzDecoder;
use git2::{Repository, Signature};
use snapshot_store::SnapshotStore;

fn fixture_project(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (rel, text) in files {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, text).unwrap();
    }
    dir
}

fn worker(base: &tempfile::TempDir) -> ExtractionWorker {
    ExtractionWorker::new(SnapshotStore::new(base.path(), "https://git.invalid"))
}

fn args(project: &Path, out: &Path) -> ParseArgs {
    ParseArgs {
        correlation_id: "harness-test".to_string(),
        output_directory_path: out.to_path_buf(),
        repository_key: None,
        commit_sha: None,
        directory_path: Some(project.to_path_buf()),
        compress_output: false,
    }
}

/// Commit the given files into a repository under the store's clone dir
/// and return the commit sha.
fn seed_repo(store_base: &Path, key: &str, files: &[(&str, &str)]) -> String {
    let dir = store_base.join("clones").join(key);
    fs::create_dir_all(&dir).unwrap();
    let repo = Repository::init(&dir).unwrap();

    let mut index = repo.index().unwrap();
    for (rel, text) in files {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, text).unwrap();
        index.add_path(Path::new(rel)).unwrap();
    }
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();

    let sig = Signature::now("tester", "tester@example.com").unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    repo.commit(Some("HEAD"), &sig, &sig, "seed", &tree, &[])
        .unwrap()
        .to_string()
}

const USER_TS: &str = r#"
import { Model } from "sequelize";

@Entity()
class User extends Model {
  id: number;
  email: string;
}
"#;

#[tokio::test]
async fn local_directory_extraction_produces_all_artifacts() {
    let project = fixture_project(&[
        ("src/user.ts", USER_TS),
        (
            "src/routes.ts",
            "import { User } from \"./user\";\napp.get(\"/users\", listUsers);\n",
        ),
    ]);
    let out = tempfile::tempdir().unwrap();
    let store_base = tempfile::tempdir().unwrap();

    let reply = worker(&store_base)
        .run(args(project.path(), out.path()), CancelFlag::new())
        .await;

    let written = reply.unwrap().unwrap();
    let mut names: Vec<_> = written.keys().cloned().collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "Classes",
            "Decorators",
            "Imports",
            "Modules",
            "OrmModels",
            "Routes",
            "Symbols"
        ]
    );
    for path in written.values() {
        assert!(Path::new(path).exists(), "missing artifact {path}");
    }
}

#[tokio::test]
async fn pre_cancelled_run_replies_empty_and_writes_nothing() {
    let project = fixture_project(&[("a.ts", "class A {}\n")]);
    let out = tempfile::tempdir().unwrap();
    let store_base = tempfile::tempdir().unwrap();

    let cancel = CancelFlag::new();
    cancel.cancel();
    let reply = worker(&store_base)
        .run(args(project.path(), out.path()), cancel)
        .await;

    assert_eq!(reply, Ok(None));
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn missing_commit_is_the_only_error_crossing_the_boundary() {
    let out = tempfile::tempdir().unwrap();
    let store_base = tempfile::tempdir().unwrap();
    seed_repo(store_base.path(), "org/demo", &[("index.ts", "const x = 1;\n")]);

    let request = ParseArgs {
        correlation_id: "harness-test".to_string(),
        output_directory_path: out.path().to_path_buf(),
        repository_key: Some("org/demo".to_string()),
        commit_sha: Some("0123456789abcdef0123456789abcdef01234567".to_string()),
        directory_path: None,
        compress_output: false,
    };
    let reply = worker(&store_base).run(request, CancelFlag::new()).await;

    assert!(matches!(
        reply,
        Err(WorkerError::MissingCommit { ref repository_key, .. })
            if repository_key == "org/demo"
    ));
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn commit_snapshot_extraction_end_to_end() {
    let out = tempfile::tempdir().unwrap();
    let store_base = tempfile::tempdir().unwrap();
    let sha = seed_repo(store_base.path(), "org/demo", &[("src/user.ts", USER_TS)]);

    let request = ParseArgs {
        correlation_id: "harness-test".to_string(),
        output_directory_path: out.path().to_path_buf(),
        repository_key: Some("org/demo".to_string()),
        commit_sha: Some(sha),
        directory_path: None,
        compress_output: false,
    };
    let reply = worker(&store_base).run(request, CancelFlag::new()).await;

    let written = reply.unwrap().unwrap();
    let classes = fs::read_to_string(&written["Classes"]).unwrap();
    assert!(classes.contains("User"));
}

#[tokio::test]
async fn compressed_artifacts_decode_back_to_json() {
    use std::io::Read;

    let project = fixture_project(&[("src/user.ts", USER_TS)]);
    let out = tempfile::tempdir().unwrap();
    let store_base = tempfile::tempdir().unwrap();

    let mut request = args(project.path(), out.path());
    request.compress_output = true;
    let reply = worker(&store_base).run(request, CancelFlag::new()).await;

    let written = reply.unwrap().unwrap();
    let path = &written["Modules"];
    assert!(path.ends_with(".json.gz"));

    let mut text = String::new();
    GzDecoder::new(fs::File::open(path).unwrap())
        .read_to_string(&mut text)
        .unwrap();
    let modules: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0]["file"], "src/user.ts");
}

#[tokio::test]
async fn cancel_signal_resolves_submitted_run_empty() {
    let project = fixture_project(&[("a.ts", "class A {}\n")]);
    let out = tempfile::tempdir().unwrap();
    let store_base = tempfile::tempdir().unwrap();

    // On the current-thread test runtime neither spawned task has run yet,
    // so the signal lands on the flag before the first artifact write.
    let (handle, join) = worker(&store_base).submit(args(project.path(), out.path()));
    handle.cancel();

    let reply = join.await.unwrap();
    assert_eq!(reply, Ok(None));
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn submitted_run_completes_when_handle_is_dropped() {
    let project = fixture_project(&[("a.ts", "class A {}\n")]);
    let out = tempfile::tempdir().unwrap();
    let store_base = tempfile::tempdir().unwrap();

    let (handle, join) = worker(&store_base).submit(args(project.path(), out.path()));
    drop(handle);

    let reply: Result<Option<BTreeMap<String, String>>, WorkerError> = join.await.unwrap();
    assert!(reply.unwrap().is_some());
}
