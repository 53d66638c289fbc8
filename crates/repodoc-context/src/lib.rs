//! Documentation context for repodoc: repository discovery, bundle
//! rendering, per-file relationship context, edit-impact analysis, and
//! the orchestrator that ties them to the cache.

pub mod context;
pub mod handler;
pub mod impact;
pub mod render;
pub mod repo;
