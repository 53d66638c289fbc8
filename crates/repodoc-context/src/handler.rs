//! The documentation orchestrator: coordinates cache lookup/refresh,
//! graph construction, and impact analysis behind a small
//! request/response surface.
//!
//! Holds the only mutable shared state in the system: one memoized
//! relationship graph per repository root (invalidated solely by an
//! explicit refresh, never by a timer) and the per-repository
//! loaded-chunk cache. Not designed for concurrent use from multiple
//! threads against the same instance.

use crate::context::{FileContext, direct_relationships, relevant_sections};
use crate::impact::analyze_impact;
use crate::render::generate_bundle;
use crate::repo::find_repo_root;
use repodoc_core::bundle::DocBundle;
use repodoc_core::cache::DocumentationCache;
use repodoc_core::config::DocConfig;
use repodoc_core::error::DocError;
use repodoc_core::relations::{ImpactReport, RelationshipGraph};
use repodoc_parser::builder::build_graph;
use repodoc_parser::extract::analyze_edit;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Composite result of a documentation request.
#[derive(Debug, Clone, Serialize)]
pub struct DocResponse {
    pub repo_root: PathBuf,
    pub documentation: DocBundle,
    /// Direct relationships for the requested file, when it has a record.
    pub context: Option<FileContext>,
    /// Documentation sections for the files in `context.related_files`,
    /// keyed by their bundle path. Empty when the file has no relations.
    pub relevant_documentation: BTreeMap<String, String>,
    /// Present only when an edit snippet was supplied.
    pub impact: Option<ImpactReport>,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// Owns the lifecycle of relationship graphs (one per active repository
/// root) and delegates persistence to the documentation cache.
pub struct DocHandler {
    config: DocConfig,
    cache: DocumentationCache,
    graphs: HashMap<PathBuf, RelationshipGraph>,
    loaded_chunks: HashMap<PathBuf, HashMap<usize, String>>,
}

impl DocHandler {
    pub fn new(config: DocConfig) -> Self {
        let cache = DocumentationCache::new(&config);
        Self {
            config,
            cache,
            graphs: HashMap::new(),
            loaded_chunks: HashMap::new(),
        }
    }

    /// Resolve the repository for `file_path`, load or build its graph
    /// and documentation bundle, and optionally analyze a proposed edit.
    pub fn request_documentation(
        &mut self,
        file_path: &Path,
        edit: Option<&str>,
    ) -> Result<DocResponse, DocError> {
        let repo_root = find_repo_root(file_path).ok_or_else(|| DocError::RepositoryNotFound {
            path: file_path.to_path_buf(),
        })?;
        self.ensure_graph(&repo_root)?;
        let graph = &self.graphs[&repo_root];

        let rel_path = relative_key(file_path, &repo_root);

        let (documentation, mut metadata, cache_hit) =
            match self.cache.get_cached_doc(&repo_root) {
                Some(cached) => (cached.documentation, cached.metadata, true),
                None => {
                    let (bundle, meta) = generate_bundle(&repo_root, &self.config.scan, graph);
                    let metadata = meta.into_map();
                    self.cache.cache_doc(&repo_root, &bundle, metadata.clone());
                    (bundle, metadata, false)
                }
            };

        let context = direct_relationships(graph, &rel_path);
        let relevant_documentation = context
            .as_ref()
            .map(|ctx| relevant_sections(&documentation, &ctx.related_files))
            .unwrap_or_default();

        // An unparsable edit is caller input, surfaced as a structured
        // failure; impact is never estimated from a malformed snippet.
        let impact = match edit {
            Some(snippet) => Some(analyze_impact(graph, &rel_path, &analyze_edit(snippet)?)),
            None => None,
        };

        metadata.insert(
            "repo_path".to_string(),
            serde_json::Value::from(repo_root.display().to_string()),
        );
        metadata.insert(
            "file_path".to_string(),
            serde_json::Value::from(rel_path.clone()),
        );
        metadata.insert("has_cached_doc".to_string(), serde_json::Value::from(cache_hit));

        Ok(DocResponse {
            repo_root,
            documentation,
            context,
            relevant_documentation,
            impact,
            metadata,
        })
    }

    /// Forcibly invalidate the cache and memoized graph for a repository
    /// and rebuild both.
    pub fn refresh(&mut self, repo_root: &Path) -> Result<DocBundle, DocError> {
        let repo_root = find_repo_root(repo_root).ok_or_else(|| DocError::RepositoryNotFound {
            path: repo_root.to_path_buf(),
        })?;

        self.cache.invalidate_cache(&repo_root);
        self.graphs.remove(&repo_root);
        self.loaded_chunks.remove(&repo_root);

        self.ensure_graph(&repo_root)?;
        let graph = &self.graphs[&repo_root];
        let (bundle, meta) = generate_bundle(&repo_root, &self.config.scan, graph);
        self.cache.cache_doc(&repo_root, &bundle, meta.into_map());
        Ok(bundle)
    }

    /// Pure delegation to the cache's chunk accessor, guarded by "is
    /// this actually a repository". Fetched chunks are memoized per
    /// root for the life of this handler.
    pub fn get_chunk(&mut self, repo_root: &Path, chunk_index: usize) -> Option<String> {
        let repo_root = find_repo_root(repo_root)?;

        if let Some(chunk) = self
            .loaded_chunks
            .get(&repo_root)
            .and_then(|chunks| chunks.get(&chunk_index))
        {
            return Some(chunk.clone());
        }

        let chunk = self.cache.get_cached_chunk(&repo_root, chunk_index)?;
        self.loaded_chunks
            .entry(repo_root)
            .or_default()
            .insert(chunk_index, chunk.clone());
        Some(chunk)
    }

    /// Build and memoize the relationship graph for a root if absent.
    /// The graph is always rebuilt in full; a partial graph is never
    /// stored.
    fn ensure_graph(&mut self, repo_root: &Path) -> Result<(), DocError> {
        if !self.graphs.contains_key(repo_root) {
            let graph = build_graph(repo_root, &self.config.scan)?;
            tracing::debug!(
                "built relationship graph for {} ({} files)",
                repo_root.display(),
                graph.len()
            );
            self.graphs.insert(repo_root.to_path_buf(), graph);
        }
        Ok(())
    }
}

/// Root-relative, `/`-separated key for a file inside a repository.
fn relative_key(file_path: &Path, repo_root: &Path) -> String {
    let absolute = if file_path.is_absolute() {
        file_path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(file_path))
            .unwrap_or_else(|_| file_path.to_path_buf())
    };
    absolute
        .strip_prefix(repo_root)
        .unwrap_or(&absolute)
        .to_string_lossy()
        .replace('\\', "/")
}
