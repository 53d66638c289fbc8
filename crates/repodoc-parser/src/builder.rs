//! Build the per-repository relationship graph by walking the tree and
//! extracting a record for every parseable source file.

use crate::extract::extract_relationships;
use repodoc_core::config::ScanConfig;
use repodoc_core::error::DocError;
use repodoc_core::relations::RelationshipGraph;
use std::path::Path;
use walkdir::WalkDir;

/// Extensions the relationship extractor understands. The wider scan
/// allow-list governs documentation and checksums; relationships are
/// extracted only for these.
const RELATIONSHIP_EXTENSIONS: &[&str] = &["py"];

/// Walk `repo_root` and extract a relationship record per eligible file,
/// keyed by root-relative path. A single file's parse failure is logged
/// and that file omitted; it never aborts the scan. An empty result is
/// reported as [`DocError::AnalysisUnavailable`] so callers can tell
/// "nothing here" from a valid graph.
pub fn build_graph(repo_root: &Path, scan: &ScanConfig) -> Result<RelationshipGraph, DocError> {
    let mut graph = RelationshipGraph::default();

    let walker = WalkDir::new(repo_root).into_iter().filter_entry(|e| {
        !(e.file_type().is_dir()
            && e.file_name()
                .to_str()
                .is_some_and(|name| scan.is_excluded_dir(name)))
    });

    for entry in walker.flatten() {
        let path = entry.path();
        if !entry.file_type().is_file() || !has_relationship_extension(path) {
            continue;
        }
        let Ok(source) = std::fs::read_to_string(path) else {
            tracing::debug!("skipping unreadable file {}", path.display());
            continue;
        };
        let rel = path
            .strip_prefix(repo_root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        match extract_relationships(&source, &rel) {
            Ok(record) => graph.insert(rel, record),
            Err(err) => {
                tracing::warn!("skipping {rel}: {err}");
            }
        }
    }

    if graph.is_empty() {
        return Err(DocError::AnalysisUnavailable {
            repo: repo_root.to_path_buf(),
        });
    }
    Ok(graph)
}

fn has_relationship_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| RELATIONSHIP_EXTENSIONS.contains(&ext))
}
