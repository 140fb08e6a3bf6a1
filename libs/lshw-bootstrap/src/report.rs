use anyhow::{Context, Result};
use lshw_core::{CategoryRegistry, Node, RecordSource, SnapshotSource, TreeAssembler};

use crate::config::AppConfig;
use crate::paths::resolve_existing;

/// Read a recorded snapshot from disk. `~` is expanded.
///
/// # Errors
/// Returns an error if the file is missing, unreadable or not a valid
/// snapshot document.
pub fn load_snapshot(raw_path: &str) -> Result<SnapshotSource> {
    let path = resolve_existing(raw_path)?;
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let source = SnapshotSource::from_json(&text)
        .with_context(|| format!("failed to load snapshot {}", path.display()))?;
    tracing::info!(path = %path.display(), "Snapshot loaded");
    Ok(source)
}

/// Build the configured report from `source` with the built-in categories.
///
/// # Errors
/// Returns an error if the registry is inconsistent or the root category
/// fails.
pub fn build_report(config: &AppConfig, source: &dyn RecordSource) -> Result<Node> {
    let registry = CategoryRegistry::builtin().context("built-in category table is invalid")?;
    let assembler = TreeAssembler::new(&registry, source, &config.inventory);
    let root = &config.report.root;
    let tree = assembler
        .assemble(root, config.report.include_children)
        .with_context(|| format!("failed to build report from '{root}'"))?;
    tracing::info!(root = %root, nodes = tree.count(), "Report built");
    Ok(tree)
}
