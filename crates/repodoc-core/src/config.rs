//! Configuration for documentation caching and repository scanning.
//!
//! Load order: `.repodoc/config.toml` → environment variables → defaults.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level repodoc configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocConfig {
    pub cache: CacheConfig,
    pub scan: ScanConfig,
}

/// Documentation cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Override for the cache directory. Defaults to a user-scoped
    /// directory (`$XDG_CACHE_HOME/repodoc` or `~/.cache/repodoc`).
    pub cache_dir: Option<PathBuf>,
    /// Seconds before a cached entry expires. Default: 24 hours.
    pub expiry_secs: u64,
    /// Approximate token budget per documentation chunk, measured as a
    /// whitespace word count per line.
    pub chunk_budget: usize,
}

/// File-eligibility rules for tree walking, checksums, and extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Extension allow-list for documented (and checksummed) files.
    pub extensions: Vec<String>,
    /// Directory names always excluded from scans and tree rendering.
    pub exclude_dirs: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            expiry_secs: 24 * 60 * 60,
            chunk_budget: 1000,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: ["py", "js", "ts", "jsx", "tsx", "md"]
                .map(String::from)
                .to_vec(),
            exclude_dirs: [".git", "__pycache__", ".pytest_cache", ".venv", "venv"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl ScanConfig {
    /// Whether a file is eligible for documentation content and checksums.
    pub fn is_eligible(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    /// Whether a directory name is excluded from all scans.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl DocConfig {
    /// Load config from `.repodoc/config.toml` in the repository root,
    /// with env var overrides. Falls back to defaults if no config file
    /// exists.
    pub fn load(repo_root: &Path) -> Result<Self> {
        let config_path = repo_root.join(".repodoc").join("config.toml");

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        env_override("REPODOC_CACHE_EXPIRY", &mut config.cache.expiry_secs);
        env_override("REPODOC_CHUNK_BUDGET", &mut config.cache.chunk_budget);

        if config.cache.chunk_budget == 0 {
            anyhow::bail!("chunk_budget must be greater than zero");
        }
        if config.scan.extensions.is_empty() {
            anyhow::bail!("scan.extensions must not be empty");
        }

        Ok(config)
    }
}
