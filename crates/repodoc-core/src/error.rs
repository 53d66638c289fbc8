//! Structured error taxonomy surfaced to callers.
//!
//! Cache-level failures never appear here: the cache always degrades to a
//! miss and the caller regenerates.

use std::path::PathBuf;

/// Errors surfaced by documentation and impact operations.
#[derive(Debug, thiserror::Error)]
pub enum DocError {
    /// No repository marker directory found walking upward from the path.
    #[error("{} is not inside a repository", path.display())]
    RepositoryNotFound { path: PathBuf },

    /// Source text (a file or an edit snippet) failed to parse. Localized
    /// to the one input, never fatal to a bulk operation.
    #[error("failed to parse {what}: {detail}")]
    ParseError { what: String, detail: String },

    /// The relationship graph could not be built for a repository —
    /// distinct from "graph built but empty".
    #[error("no relationships available for {}", repo.display())]
    AnalysisUnavailable { repo: PathBuf },

    /// The cache directory could not be prepared. Read/write failures on
    /// individual entries degrade to misses instead of raising this.
    #[error("documentation cache unavailable: {0}")]
    CacheUnavailable(String),
}

impl DocError {
    pub fn parse(what: impl Into<String>, detail: impl Into<String>) -> Self {
        DocError::ParseError {
            what: what.into(),
            detail: detail.into(),
        }
    }
}
