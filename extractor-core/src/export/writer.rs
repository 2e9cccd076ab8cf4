//! Feature writer: persists one logical output to a uniquely named file
//! under the run's result directory, optionally gzip-compressed.
//!
//! Filenames are `<prefix-lowercased>__<frontend-tag>_<uuid>.json[.gz]`;
//! the random component guarantees no collision even across concurrent or
//! retried runs targeting the same output directory. Compressed payloads
//! stream through the gzip encoder into a buffered file sink rather than
//! buffering a second compressed copy in memory.

use crate::context::ParseContext;
use crate::errors::Result;
use crate::model::feature::FeatureTable;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

/// Persist a tabular `{header, rows}` feature payload. Returns the path of
/// the written file.
pub fn write_features(
    ctx: &ParseContext,
    header: &[String],
    rows: &[Vec<Value>],
    filename_prefix: &str,
) -> Result<PathBuf> {
    ctx.ensure_active()?;
    if rows.is_empty() {
        warn!(
            correlation_id = %ctx.correlation_id,
            "writer: empty rows for {filename_prefix}, writing anyway"
        );
    }
    let payload = FeatureTable {
        header: header.to_vec(),
        rows: rows.to_vec(),
    };
    write_payload(ctx, &payload, filename_prefix)
}

/// Persist an arbitrary entity list as a bare JSON array.
pub fn write_elements<T: Serialize>(
    ctx: &ParseContext,
    elements: &[T],
    filename_prefix: &str,
) -> Result<PathBuf> {
    ctx.ensure_active()?;
    if elements.is_empty() {
        warn!(
            correlation_id = %ctx.correlation_id,
            "writer: empty element list for {filename_prefix}, writing anyway"
        );
    }
    write_payload(ctx, &elements, filename_prefix)
}

fn write_payload<T: Serialize + ?Sized>(
    ctx: &ParseContext,
    payload: &T,
    filename_prefix: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(&ctx.output_directory_path)?;

    let name = feature_filename(filename_prefix, ctx.frontend_tag, ctx.compress_output);
    let path = ctx.output_directory_path.join(name);

    let file = File::create(&path)?;
    if ctx.compress_output {
        let mut enc = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer(&mut enc, payload)?;
        enc.finish()?.flush()?;
    } else {
        let mut w = BufWriter::new(file);
        serde_json::to_writer(&mut w, payload)?;
        w.flush()?;
    }

    info!(
        correlation_id = %ctx.correlation_id,
        "writer: wrote {filename_prefix} -> {}",
        path.display()
    );
    Ok(path)
}

/// Compose a collision-free artifact filename.
pub fn feature_filename(prefix: &str, frontend_tag: &str, compress: bool) -> String {
    let ext = if compress { ".json.gz" } else { ".json" };
    format!(
        "{}__{}_{}{}",
        prefix.to_lowercase(),
        frontend_tag,
        Uuid::new_v4(),
        ext
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ctx_for;
    use flate2::read::GzDecoder;
    use serde_json::json;
    use std::collections::BTreeSet;
    use std::io::Read;

    #[test]
    fn tabular_round_trip_plain() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_for(&dir);
        let header = vec!["a".to_string(), "b".to_string()];
        let rows = vec![vec![json!(1), json!(2)], vec![json!(3), json!(4)]];

        let path = write_features(&ctx, &header, &rows, "Classes").unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("classes__ts_"));
        assert!(name.ends_with(".json"));

        let text = fs::read_to_string(&path).unwrap();
        let expected = FeatureTable {
            header: header.clone(),
            rows: rows.clone(),
        };
        assert_eq!(text, serde_json::to_string(&expected).unwrap());

        let back: FeatureTable = serde_json::from_str(&text).unwrap();
        assert_eq!(back, expected);
    }

    #[test]
    fn tabular_round_trip_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ctx_for(&dir);
        ctx.compress_output = true;
        let header = vec!["a".to_string(), "b".to_string()];
        let rows = vec![vec![json!(1), json!(2)], vec![json!(3), json!(4)]];

        let path = write_features(&ctx, &header, &rows, "Classes").unwrap();
        assert!(path.to_string_lossy().ends_with(".json.gz"));

        let mut text = String::new();
        GzDecoder::new(File::open(&path).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        let expected = FeatureTable { header, rows };
        assert_eq!(text, serde_json::to_string(&expected).unwrap());
    }

    #[test]
    fn element_list_is_a_bare_array() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_for(&dir);
        let elements = vec![json!({"name": "User"}), json!({"name": "Role"})];
        let path = write_elements(&ctx, &elements, "OrmModels").unwrap();
        let back: Vec<Value> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, elements);
    }

    #[test]
    fn empty_content_is_still_written() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_for(&dir);
        let path = write_elements::<Value>(&ctx, &[], "Empty").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn cancelled_context_refuses_to_write() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_for(&dir);
        ctx.cancel.cancel();
        let err = write_elements::<Value>(&ctx, &[], "Never").unwrap_err();
        assert!(matches!(err, crate::errors::ExtractError::Cancelled));
    }

    #[test]
    fn filenames_never_collide() {
        let names: BTreeSet<String> = (0..1000)
            .map(|_| feature_filename("Classes", "ts", false))
            .collect();
        assert_eq!(names.len(), 1000);
    }
}
