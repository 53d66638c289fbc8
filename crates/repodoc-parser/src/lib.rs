//! Tree-sitter based relationship extraction for repodoc.
//!
//! Extracts imports, function definitions (with their called names and
//! locally-assigned variables), and module-level variables from Python
//! source, and builds the per-repository relationship graph.

pub mod builder;
pub mod extract;
