//! Checksum-gated, time-bounded, chunked cache for documentation bundles.
//!
//! One JSON entry per repository, keyed by a sha256 of the absolute
//! repository path. Every read revalidates expiry and the full per-file
//! checksum map; any decode or I/O failure degrades to a miss, never an
//! error — the caller's fallback is always "regenerate".

use crate::bundle::DocBundle;
use crate::config::{DocConfig, ScanConfig};
use crate::error::DocError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use walkdir::WalkDir;

const CACHE_DIR_NAME: &str = "repodoc";

/// Persisted cache entry, one JSON document per repository.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    /// Seconds since the epoch at write time.
    timestamp: f64,
    /// Relative path → sha256 hex digest for every eligible file at
    /// write time.
    checksums: BTreeMap<String, String>,
    documentation: DocBundle,
    /// Lossless line-partition of `documentation.render()`.
    chunks: Vec<String>,
    metadata: BTreeMap<String, serde_json::Value>,
}

/// A validated cached bundle returned to callers.
#[derive(Debug, Clone)]
pub struct CachedDoc {
    pub documentation: DocBundle,
    pub chunks: Vec<String>,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// Persistent, checksum-validated documentation store. Sole writer and
/// reader of its cache directory.
#[derive(Debug, Clone)]
pub struct DocumentationCache {
    cache_dir: PathBuf,
    expiry_secs: u64,
    chunk_budget: usize,
    scan: ScanConfig,
}

impl DocumentationCache {
    pub fn new(config: &DocConfig) -> Self {
        let cache_dir = config
            .cache
            .cache_dir
            .clone()
            .unwrap_or_else(default_cache_dir);
        Self {
            cache_dir,
            expiry_secs: config.cache.expiry_secs,
            chunk_budget: config.cache.chunk_budget,
            scan: config.scan.clone(),
        }
    }

    /// Cache file path for a repository: sha256 of the absolute path
    /// string, so keys are filesystem-safe and bounded in length.
    fn entry_path(&self, repo_root: &Path) -> PathBuf {
        let digest = Sha256::digest(repo_root.to_string_lossy().as_bytes());
        self.cache_dir
            .join(format!("{}.json", hex_encode_lower(&digest)))
    }

    /// Sha256 checksums of the raw bytes of every eligible file, keyed by
    /// root-relative path. Content-hash based: mtimes are unreliable
    /// across checkouts and clones.
    pub fn file_checksums(&self, repo_root: &Path) -> BTreeMap<String, String> {
        let mut checksums = BTreeMap::new();
        let walker = WalkDir::new(repo_root).into_iter().filter_entry(|e| {
            !(e.file_type().is_dir()
                && e.file_name()
                    .to_str()
                    .is_some_and(|name| self.scan.is_excluded_dir(name)))
        });
        for entry in walker.flatten() {
            let path = entry.path();
            if !entry.file_type().is_file() || !self.scan.is_eligible(path) {
                continue;
            }
            let Ok(bytes) = fs::read(path) else {
                continue;
            };
            let rel = path
                .strip_prefix(repo_root)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");
            checksums.insert(rel, hex_encode_lower(&Sha256::digest(&bytes)));
        }
        checksums
    }

    /// Cache a documentation bundle with metadata. Failures are logged
    /// and swallowed: the in-memory result stays usable for this call and
    /// the next call simply regenerates.
    pub fn cache_doc(
        &self,
        repo_root: &Path,
        documentation: &DocBundle,
        metadata: BTreeMap<String, serde_json::Value>,
    ) {
        if let Err(err) = self.try_cache_doc(repo_root, documentation, metadata) {
            tracing::warn!(
                "failed to cache documentation for {}: {err:#}",
                repo_root.display()
            );
        }
    }

    fn try_cache_doc(
        &self,
        repo_root: &Path,
        documentation: &DocBundle,
        metadata: BTreeMap<String, serde_json::Value>,
    ) -> Result<()> {
        self.ensure_cache_dir()?;

        let entry = CacheEntry {
            timestamp: unix_now(),
            checksums: self.file_checksums(repo_root),
            documentation: documentation.clone(),
            chunks: self.split_chunks(&documentation.render()),
            metadata,
        };

        let path = self.entry_path(repo_root);
        let json = serde_json::to_string(&entry).context("failed to serialize cache entry")?;

        // Write-to-temp-then-rename so a concurrent reader never observes
        // a half-written entry.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("failed to write cache entry {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("failed to persist cache entry {}", path.display()))?;
        Ok(())
    }

    /// Return the cached bundle if the entry exists, is younger than the
    /// expiry window, and the freshly recomputed checksum map matches the
    /// stored one exactly. Everything else — including a corrupt or
    /// unreadable entry — is a miss.
    pub fn get_cached_doc(&self, repo_root: &Path) -> Option<CachedDoc> {
        let path = self.entry_path(repo_root);
        let raw = fs::read_to_string(&path).ok()?;
        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!("corrupt cache entry {}: {err}", path.display());
                return None;
            }
        };

        if unix_now() - entry.timestamp >= self.expiry_secs as f64 {
            tracing::debug!("cache entry expired for {}", repo_root.display());
            return None;
        }

        // A single changed, added, or removed file invalidates the whole
        // entry. There is no partial cache validity.
        if self.file_checksums(repo_root) != entry.checksums {
            tracing::debug!("checksum mismatch for {}", repo_root.display());
            return None;
        }

        Some(CachedDoc {
            documentation: entry.documentation,
            chunks: entry.chunks,
            metadata: entry.metadata,
        })
    }

    /// Fetch one chunk for lazy retrieval. Valid only if the backing
    /// entry passes the full validity check; out-of-range is `None`.
    pub fn get_cached_chunk(&self, repo_root: &Path, chunk_index: usize) -> Option<String> {
        self.get_cached_doc(repo_root)?.chunks.get(chunk_index).cloned()
    }

    /// Idempotent removal of a repository's entry. Absence is not an
    /// error.
    pub fn invalidate_cache(&self, repo_root: &Path) {
        let path = self.entry_path(repo_root);
        if let Err(err) = fs::remove_file(&path)
            && err.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!("failed to remove cache entry {}: {err}", path.display());
        }
    }

    /// Create the cache directory if it does not exist. Failure means no
    /// entry can ever be written for this store, which is distinct from a
    /// per-entry I/O failure.
    fn ensure_cache_dir(&self) -> Result<(), DocError> {
        fs::create_dir_all(&self.cache_dir).map_err(|err| {
            DocError::CacheUnavailable(format!(
                "failed to create cache directory {}: {err}",
                self.cache_dir.display()
            ))
        })
    }

    /// Split the rendered documentation by line, accumulating a word
    /// count per line until the chunk budget is exceeded. Word count is a
    /// cheap proxy for token cost; boundaries are approximate on purpose.
    fn split_chunks(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_size = 0;

        for line in text.split('\n') {
            let line_size = line.split_whitespace().count();
            if current_size + line_size > self.chunk_budget && !current.is_empty() {
                chunks.push(current.join("\n"));
                current = vec![line];
                current_size = line_size;
            } else {
                current.push(line);
                current_size += line_size;
            }
        }
        if !current.is_empty() {
            chunks.push(current.join("\n"));
        }
        chunks
    }
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

fn hex_encode_lower(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len().saturating_mul(2));
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

fn default_cache_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CACHE_HOME") {
        return PathBuf::from(xdg).join(CACHE_DIR_NAME);
    }
    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home).join(".cache").join(CACHE_DIR_NAME);
    }
    std::env::temp_dir().join(CACHE_DIR_NAME)
}
