//! Per-file relationship context: the file's own record plus the files
//! directly coupled to it.

use crate::impact::module_qualified_name;
use repodoc_core::bundle::DocBundle;
use repodoc_core::relations::{FunctionRecord, RelationshipGraph};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Direct relationships for one file, as returned in a documentation
/// response.
#[derive(Debug, Clone, Serialize)]
pub struct FileContext {
    pub imports: Vec<String>,
    pub functions: BTreeMap<String, FunctionRecord>,
    pub variables: BTreeSet<String>,
    /// Files that import this file or call its functions.
    pub related_files: BTreeSet<String>,
}

/// Look up `rel_path` in the graph and collect the files coupled to it.
/// `None` when the file has no relationship record.
pub fn direct_relationships(graph: &RelationshipGraph, rel_path: &str) -> Option<FileContext> {
    let record = graph.get(rel_path)?;
    let module = module_qualified_name(rel_path);

    let mut related_files = BTreeSet::new();
    for (other_file, other_record) in &graph.files {
        if other_file == rel_path {
            continue;
        }
        let imports_this = other_record.imports.iter().any(|imp| imp.contains(&module));
        let calls_this = other_record
            .functions
            .values()
            .flat_map(|f| f.calls.iter())
            .any(|call| record.functions.contains_key(call));
        if imports_this || calls_this {
            related_files.insert(other_file.clone());
        }
    }

    Some(FileContext {
        imports: record.imports.clone(),
        functions: record.functions.clone(),
        variables: record.variables.clone(),
        related_files,
    })
}

/// Filter a bundle's concatenated contents down to the sections for a
/// set of related files, keyed by their `File:` header path. Files
/// without a section in the bundle are simply absent from the result.
pub fn relevant_sections(
    bundle: &DocBundle,
    related_files: &BTreeSet<String>,
) -> BTreeMap<String, String> {
    let mut sections = BTreeMap::new();
    let mut current_file: Option<String> = None;
    let mut current_lines: Vec<&str> = Vec::new();

    for line in bundle.contents.split('\n') {
        if let Some(name) = line.strip_prefix("File: ") {
            if let Some(file) = current_file.take()
                && related_files.contains(&file)
            {
                sections.insert(file, current_lines.join("\n"));
            }
            current_file = Some(name.trim().to_string());
            current_lines = vec![line];
        } else if current_file.is_some() {
            current_lines.push(line);
        }
    }
    if let Some(file) = current_file
        && related_files.contains(&file)
    {
        sections.insert(file, current_lines.join("\n"));
    }
    sections
}
