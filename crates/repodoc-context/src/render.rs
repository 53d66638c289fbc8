//! Render the documentation bundle: ASCII directory tree and
//! concatenated file contents.

use repodoc_core::bundle::{DocBundle, DocMetadata};
use repodoc_core::config::ScanConfig;
use repodoc_core::relations::RelationshipGraph;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Compiled-artifact extensions never shown in the tree.
const BINARY_EXTENSIONS: &[&str] = &[".pyc", ".pyo", ".pyd", ".so", ".dll"];

/// Assemble a complete documentation bundle for a repository from its
/// already-built relationship graph.
pub fn generate_bundle(
    repo_root: &Path,
    scan: &ScanConfig,
    graph: &RelationshipGraph,
) -> (DocBundle, DocMetadata) {
    let tree = render_tree(repo_root, scan);
    let (contents, files_analyzed) = render_contents(repo_root, scan);
    let bundle = DocBundle {
        tree,
        contents,
        relationships: graph.clone(),
    };
    let metadata = DocMetadata {
        files_analyzed,
        relationships_found: graph.len(),
    };
    (bundle, metadata)
}

/// Render the directory tree with `├──`/`└──` connectors. Entries sort
/// by (is-file, name) ascending, so directories come before files.
pub fn render_tree(root: &Path, scan: &ScanConfig) -> String {
    let mut lines = Vec::new();
    add_to_tree(root, "", scan, &mut lines);
    lines.join("\n")
}

fn add_to_tree(dir: &Path, prefix: &str, scan: &ScanConfig, lines: &mut Vec<String>) {
    let Ok(read) = fs::read_dir(dir) else {
        return;
    };
    let mut entries: Vec<(bool, String, PathBuf)> = read
        .flatten()
        .map(|e| {
            let path = e.path();
            (
                path.is_file(),
                e.file_name().to_string_lossy().into_owned(),
                path,
            )
        })
        .filter(|(is_file, name, _)| {
            if *is_file {
                !BINARY_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
            } else {
                !scan.is_excluded_dir(name)
            }
        })
        .collect();
    entries.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));

    let count = entries.len();
    for (i, (is_file, name, path)) in entries.into_iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last { "└── " } else { "├── " };
        lines.push(format!("{prefix}{connector}{name}"));
        if !is_file {
            let next = format!("{prefix}{}", if is_last { "    " } else { "│   " });
            add_to_tree(&path, &next, scan, lines);
        }
    }
}

/// Concatenate every eligible file's contents with `File:` separators.
/// Returns the text and the number of files included.
pub fn render_contents(root: &Path, scan: &ScanConfig) -> (String, usize) {
    let mut sections = Vec::new();
    for rel in collect_eligible_files(root, scan) {
        let path = root.join(&rel);
        let section = match fs::read_to_string(&path) {
            Ok(content) => file_section(&rel, &content),
            Err(err) => format!("Error reading {rel}: {err}\n"),
        };
        sections.push(section);
    }
    let count = sections.len();
    (sections.join("\n"), count)
}

/// Eligible files under `root`, as sorted root-relative paths.
pub fn collect_eligible_files(root: &Path, scan: &ScanConfig) -> Vec<String> {
    let walker = WalkDir::new(root).into_iter().filter_entry(|e| {
        !(e.file_type().is_dir()
            && e.file_name()
                .to_str()
                .is_some_and(|name| scan.is_excluded_dir(name)))
    });
    let mut files: Vec<String> = walker
        .flatten()
        .filter(|e| e.file_type().is_file() && scan.is_eligible(e.path()))
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap_or(e.path())
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}

fn file_section(rel: &str, content: &str) -> String {
    let separator = "=".repeat(48);
    format!("File: {rel}\n{separator}\n{content}\n{separator}\n")
}
