//! AST traversal and visitor dispatch engine.
//!
//! Visits every node of every root file exactly once, pre-order,
//! depth-first, invoking each registered visitor's hooks when it claims
//! interest. The AST is never mutated.
//!
//! Cancellation is polled before every node, so abort latency is bounded by
//! single-node processing time. An [`ExtractError::OutOfScopeModule`]
//! raised by any visitor is caught at file granularity only: that file is
//! abandoned (its partial entities discarded) and the walk continues with
//! the next root file.

use crate::context::{CancelFlag, ParseContext};
use crate::core::ids::entity_key;
use crate::errors::{ExtractError, Result};
use crate::frontend::SourceFile;
use crate::model::entity::ModuleEntity;
use crate::visitors::Visitor;
use tracing::{debug, warn};
use tree_sitter::Node;

/// Walk every root file, dispatching visitors and absorbing per-file
/// out-of-scope signals. Cancellation and any other error propagate.
pub fn walk_project(
    ctx: &mut ParseContext,
    files: &[SourceFile],
    visitors: &mut [Box<dyn Visitor>],
) -> Result<()> {
    for file in files {
        match walk_file(ctx, file, visitors) {
            Ok(()) => {
                ctx.state.files_visited += 1;
            }
            Err(ExtractError::OutOfScopeModule { file: f }) => {
                warn!("traverse: skipping out-of-scope module {f}");
                ctx.state.remove_module(&file.rel_path);
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

/// Walk one root file: resolve/create its [`ModuleEntity`], then recurse.
pub fn walk_file(
    ctx: &mut ParseContext,
    file: &SourceFile,
    visitors: &mut [Box<dyn Visitor>],
) -> Result<()> {
    ctx.ensure_active()?;
    debug!("traverse: walk {}", file.rel_path);

    let cancel = ctx.cancel.clone();
    let module = ctx.state.module_mut(&file.rel_path, file.language);
    walk_node(&cancel, file, file.tree.root_node(), visitors, module)
}

fn walk_node(
    cancel: &CancelFlag,
    file: &SourceFile,
    node: Node,
    visitors: &mut [Box<dyn Visitor>],
    module: &mut ModuleEntity,
) -> Result<()> {
    cancel.ensure_active()?;

    // Fast path: most nodes match nothing — recurse without allocating.
    if !visitors.iter().any(|v| v.should_visit(&node)) {
        return walk_children(cancel, file, node, visitors, module);
    }

    let matched: Vec<usize> = visitors
        .iter()
        .enumerate()
        .filter(|(_, v)| v.should_visit(&node))
        .map(|(i, _)| i)
        .collect();

    let key = entity_key(&file.rel_path, &node);
    for &i in &matched {
        visitors[i].visit_before_children(file, &node, &key, module)?;
    }

    walk_children(cancel, file, node, visitors, module)?;

    for &i in &matched {
        visitors[i].visit_after_children(file, &node, &key, module)?;
    }
    Ok(())
}

fn walk_children(
    cancel: &CancelFlag,
    file: &SourceFile,
    node: Node,
    visitors: &mut [Box<dyn Visitor>],
    module: &mut ModuleEntity,
) -> Result<()> {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            walk_node(cancel, file, child, visitors, module)?;
        }
    }
    Ok(())
}
