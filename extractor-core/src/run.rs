//! Pipeline orchestration.
//!
//! One call runs the whole extraction for a prepared [`ParseContext`]:
//! scan the project directory, parse every root file through the
//! front-end, dispatch the visitor registry over each AST, run the
//! reconcile pass, assemble per-category feature payloads and persist
//! them through the writer.
//!
//! Cancellation is re-checked between stages, so a cancel that lands
//! mid-run never produces a partially written category after the stage
//! boundary it arrived at.

use crate::config;
use crate::context::ParseContext;
use crate::core::fs_scan::scan_project;
use crate::errors::Result;
use crate::export::{features, writer};
use crate::frontend::Frontend;
use crate::model::feature::FeatureTable;
use crate::visitors::Visitor;
use std::collections::BTreeMap;
use tracing::info;

/// Category prefixes, fixed so downstream consumers can pattern-match
/// artifact names.
const FEATURE_CLASSES: &str = "Classes";
const FEATURE_DECORATORS: &str = "Decorators";
const FEATURE_ROUTES: &str = "Routes";
const FEATURE_IMPORTS: &str = "Imports";
const FEATURE_SYMBOLS: &str = "Symbols";
const FEATURE_ORM_MODELS: &str = "OrmModels";
const FEATURE_MODULES: &str = "Modules";

/// Run the full pipeline for one parse request.
///
/// Returns the map of feature category name to written artifact path.
/// Artifacts are all-or-nothing per run: any error (including
/// cancellation) aborts before the remaining categories are written, and
/// the caller discards the run.
#[tracing::instrument(skip_all, fields(correlation_id = %ctx.correlation_id))]
pub fn extract_features(
    ctx: &mut ParseContext,
    frontend: &dyn Frontend,
    visitors: &mut Vec<Box<dyn Visitor>>,
) -> Result<BTreeMap<String, String>> {
    ctx.frontend_tag = frontend.tag();
    ctx.ensure_active()?;

    let cfg = config::load_from_env_or_default()?;
    let scan = scan_project(&ctx.directory_path, &cfg)?;
    info!("run: scanned {} source files", scan.files.len());

    ctx.ensure_active()?;
    let files = frontend.parse_project(&scan.root, &scan.files)?;

    crate::traverse::walk_project(ctx, &files, visitors)?;
    info!(
        "run: traversal done, files_visited={}, entities={}",
        ctx.state.files_visited,
        ctx.state.entity_count()
    );

    for visitor in visitors.iter_mut() {
        ctx.cancel.ensure_active()?;
        visitor.reconcile(&mut ctx.state)?;
    }

    let mut written = BTreeMap::new();

    let tables: [(&str, FeatureTable); 5] = [
        (FEATURE_CLASSES, features::classes_table(&ctx.state)),
        (FEATURE_DECORATORS, features::decorators_table(&ctx.state)),
        (FEATURE_ROUTES, features::routes_table(&ctx.state)),
        (FEATURE_IMPORTS, features::imports_table(&ctx.state)),
        (FEATURE_SYMBOLS, features::symbols_table(&ctx.state)),
    ];
    for (name, table) in tables {
        let path = writer::write_features(ctx, &table.header, &table.rows, name)?;
        written.insert(name.to_string(), path.to_string_lossy().into_owned());
    }

    let orm = features::orm_model_elements(&ctx.state);
    let path = writer::write_elements(ctx, &orm, FEATURE_ORM_MODELS)?;
    written.insert(
        FEATURE_ORM_MODELS.to_string(),
        path.to_string_lossy().into_owned(),
    );

    let modules = features::module_elements(&ctx.state);
    let path = writer::write_elements(ctx, &modules, FEATURE_MODULES)?;
    written.insert(
        FEATURE_MODULES.to_string(),
        path.to_string_lossy().into_owned(),
    );

    info!("run: wrote {} feature artifacts", written.len());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CancelFlag, ParseContext};
    use crate::errors::ExtractError;
    use crate::frontend::ts::{TsFrontend, TsTypeFacility};
    use crate::visitors::default_registry;
    use std::fs;
    use std::sync::Arc;

    fn project(files: &[(&str, &str)]) -> tempfile::TempDir {
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

    fn ctx(dir: &tempfile::TempDir, out: &tempfile::TempDir) -> ParseContext {
        ParseContext::new(
            "run-test".to_string(),
            dir.path().to_path_buf(),
            out.path().to_path_buf(),
            false,
            CancelFlag::new(),
        )
    }

    #[test]
    fn full_pipeline_writes_every_category() {
        let dir = project(&[
            (
                "src/user.ts",
                r#"
import { Model } from "sequelize";

@Entity()
class User extends Model {
  id: number;
  name: string;
}
"#,
            ),
            (
                "src/routes.ts",
                "import { User } from \"./user\";\napp.get(\"/users\", listUsers);\n",
            ),
        ]);
        let out = tempfile::tempdir().unwrap();
        let mut ctx = ctx(&dir, &out);
        let mut visitors = default_registry(Arc::new(TsTypeFacility));

        let written = extract_features(&mut ctx, &TsFrontend, &mut visitors).unwrap();

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
            assert!(fs::metadata(path).unwrap().len() > 0);
        }

        let classes: crate::model::feature::FeatureTable =
            serde_json::from_str(&fs::read_to_string(&written["Classes"]).unwrap()).unwrap();
        assert_eq!(classes.rows.len(), 1);
        assert_eq!(classes.rows[0][2], serde_json::json!("User"));

        // The reconcile pass published the class into the symbol registry.
        let symbols: crate::model::feature::FeatureTable =
            serde_json::from_str(&fs::read_to_string(&written["Symbols"]).unwrap()).unwrap();
        assert_eq!(symbols.header, vec!["name", "file"]);
        assert!(symbols.rows.contains(&vec![
            serde_json::json!("User"),
            serde_json::json!("src/user.ts")
        ]));
    }

    #[test]
    fn cancelled_before_start_writes_nothing() {
        let dir = project(&[("a.ts", "class A {}\n")]);
        let out = tempfile::tempdir().unwrap();
        let mut ctx = ctx(&dir, &out);
        ctx.cancel.cancel();
        let mut visitors = default_registry(Arc::new(TsTypeFacility));

        let err = extract_features(&mut ctx, &TsFrontend, &mut visitors).unwrap_err();
        assert!(matches!(err, ExtractError::Cancelled));
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn empty_project_still_writes_artifacts() {
        let dir = project(&[("notes.md", "# nothing to parse")]);
        let out = tempfile::tempdir().unwrap();
        let mut ctx = ctx(&dir, &out);
        let mut visitors = default_registry(Arc::new(TsTypeFacility));

        let written = extract_features(&mut ctx, &TsFrontend, &mut visitors).unwrap();
        assert_eq!(written.len(), 7);
        let modules = fs::read_to_string(&written["Modules"]).unwrap();
        assert_eq!(modules, "[]");
    }
}
