//! Core types and storage for repodoc documentation snapshots.
//!
//! Provides the relationship data model ([`relations::RelationshipGraph`]),
//! the documentation bundle, configuration, the structured error taxonomy,
//! and the checksum-gated [`cache::DocumentationCache`].

pub mod bundle;
pub mod cache;
pub mod config;
pub mod error;
pub mod relations;
