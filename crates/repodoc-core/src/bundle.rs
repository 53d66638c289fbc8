//! The documentation bundle: tree rendering, concatenated contents, and
//! the relationship graph, plus the flat text form used for chunking.

use crate::relations::RelationshipGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A complete documentation snapshot of one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocBundle {
    /// ASCII-art directory tree.
    pub tree: String,
    /// Concatenated eligible-file contents with `File:` separators.
    pub contents: String,
    /// Relationship record per eligible source file.
    pub relationships: RelationshipGraph,
}

impl DocBundle {
    /// Flat text body. This is the string the cache partitions into
    /// chunks; rejoining the chunks with newlines reproduces it.
    pub fn render(&self) -> String {
        format!(
            "Repository structure:\n{}\n\nFile contents:\n{}",
            self.tree, self.contents
        )
    }
}

/// Summary counters persisted alongside a cached bundle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DocMetadata {
    pub files_analyzed: usize,
    pub relationships_found: usize,
}

impl DocMetadata {
    /// Convert to the free-form metadata mapping stored in a cache entry.
    pub fn into_map(self) -> BTreeMap<String, serde_json::Value> {
        BTreeMap::from([
            (
                "files_analyzed".to_string(),
                serde_json::Value::from(self.files_analyzed),
            ),
            (
                "relationships_found".to_string(),
                serde_json::Value::from(self.relationships_found),
            ),
        ])
    }
}
