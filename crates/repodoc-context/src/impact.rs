//! Edit-impact analysis over the relationship graph.
//!
//! Three evidence categories — calls, variables, imports — are checked
//! independently and their results unioned. Matching is name-based
//! heuristics, not symbol resolution: each category is applied in both
//! directions (who depends on the edit, and what the edit now depends
//! on). Risk only escalates as evidence accumulates.

use repodoc_core::relations::{EditAnalysis, ImpactReport, RelationshipGraph, RiskLevel};

/// Analyze which files are plausibly affected by an edit to
/// `edited_path`. Computed fresh per call; never cached.
pub fn analyze_impact(
    graph: &RelationshipGraph,
    edited_path: &str,
    edit: &EditAnalysis,
) -> ImpactReport {
    let mut report = ImpactReport::default();
    let edited_module = module_qualified_name(edited_path);

    for (other_file, record) in &graph.files {
        if other_file == edited_path {
            continue;
        }

        // Call evidence: files whose functions call a function the edit
        // modifies…
        for func_name in &edit.modified.functions {
            if record.functions.values().any(|f| f.calls.contains(func_name)) {
                report.affected_files.insert(other_file.clone());
                report
                    .warnings
                    .push(format!("Function '{func_name}' is called in {other_file}"));
                report.risk_level.escalate(RiskLevel::Medium);
            }
        }
        // …and files defining a function the edit's new code calls.
        for callee in &edit.calls {
            if record.functions.contains_key(callee) {
                report.affected_files.insert(other_file.clone());
                report
                    .warnings
                    .push(format!("Function '{callee}' is defined in {other_file}"));
                report.risk_level.escalate(RiskLevel::Medium);
            }
        }

        // Variable evidence: modified names used at module level
        // elsewhere.
        for var_name in &edit.modified.variables {
            if record.variables.contains(var_name) {
                report.affected_files.insert(other_file.clone());
                report
                    .warnings
                    .push(format!("Variable '{var_name}' is used in {other_file}"));
                report.risk_level.escalate(RiskLevel::Medium);
            }
        }

        // Import evidence dominates: a load-time dependency in either
        // direction means the other file fails to load if the coupling
        // breaks.
        if record
            .imports
            .iter()
            .any(|imp| imp.contains(&edited_module))
        {
            report.affected_files.insert(other_file.clone());
            report.warnings.push(format!(
                "Module '{edited_module}' is imported in {other_file}"
            ));
            report.risk_level.escalate(RiskLevel::High);
        }
        let other_module = module_qualified_name(other_file);
        if edit
            .modified
            .imports
            .iter()
            .any(|imp| imp.contains(&other_module))
        {
            report.affected_files.insert(other_file.clone());
            report.warnings.push(format!(
                "Edit imports module '{other_module}' from {other_file}"
            ));
            report.risk_level.escalate(RiskLevel::High);
        }
    }

    report
}

/// A file's module-qualified name: path separators become the module
/// qualifier and the final extension is stripped.
pub fn module_qualified_name(path: &str) -> String {
    let without_ext = match path.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.contains('/') => stem,
        _ => path,
    };
    without_ext.replace('/', ".")
}
