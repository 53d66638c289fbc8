//! Relationship data model: per-file records, the repository graph,
//! and edit-impact result types.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Relationships recorded for one function definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    /// Bare-identifier names invoked inside the function body.
    pub calls: BTreeSet<String>,
    /// Names assigned inside the function body.
    pub variables: BTreeSet<String>,
    /// 1-based line of the `def` statement.
    pub defined_at_line: usize,
}

/// Flat relationship summary of a single source file.
/// Built fresh per extraction call; immutable once returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    /// Qualified import names in source order (`from m import a` → `m.a`).
    pub imports: Vec<String>,
    /// Function name → record. Methods and nested functions are keyed by
    /// their bare name, matching the heuristic call evidence in impact
    /// analysis.
    pub functions: BTreeMap<String, FunctionRecord>,
    /// Names assigned at module scope.
    pub variables: BTreeSet<String>,
}

/// Per-repository mapping from root-relative path to its relationship
/// record. Always rebuilt in full; a partial graph is never exposed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipGraph {
    /// Keys are repository-relative paths with `/` separators.
    pub files: BTreeMap<String, RelationshipRecord>,
}

impl RelationshipGraph {
    pub fn insert(&mut self, path: impl Into<String>, record: RelationshipRecord) {
        self.files.insert(path.into(), record);
    }

    pub fn get(&self, path: &str) -> Option<&RelationshipRecord> {
        self.files.get(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Names introduced or assigned by an edit snippet, independent of the
/// target file's existing content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedElements {
    pub functions: BTreeSet<String>,
    pub classes: BTreeSet<String>,
    pub imports: BTreeSet<String>,
    pub variables: BTreeSet<String>,
}

impl ModifiedElements {
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
            && self.classes.is_empty()
            && self.imports.is_empty()
            && self.variables.is_empty()
    }
}

/// An edit snippet reduced to the facts impact analysis consumes: the
/// modified elements plus the names the edit's new code calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditAnalysis {
    pub modified: ModifiedElements,
    /// Names invoked inside functions the edit introduces.
    pub calls: BTreeSet<String>,
}

/// Severity of an edit's estimated blast radius.
///
/// Ordered: `Low < Medium < High`. Risk only escalates as evidence
/// accumulates.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Raise to `level` if it is more severe than the current value.
    pub fn escalate(&mut self, level: RiskLevel) {
        if level > *self {
            *self = level;
        }
    }
}

/// Result of analyzing one proposed edit against the relationship graph.
/// Computed fresh per call, never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactReport {
    pub affected_files: BTreeSet<String>,
    /// Human-readable evidence in discovery order.
    pub warnings: Vec<String>,
    pub risk_level: RiskLevel,
}
