//! Extract a relationship record from one Python source file, and the
//! modified-elements record from an edit snippet.
//!
//! Calls are recorded only for direct name-reference invocations inside a
//! function body; attribute and indirect calls are not resolved. This is
//! a deliberate heuristic, not symbol resolution.

use repodoc_core::error::DocError;
use repodoc_core::relations::{EditAnalysis, FunctionRecord, ModifiedElements, RelationshipRecord};

/// Parse file content into a relationship record. Pure function of the
/// content; `path` is only used to label parse failures.
pub fn extract_relationships(source: &str, path: &str) -> Result<RelationshipRecord, DocError> {
    let tree = parse_python(source, path)?;
    let mut record = RelationshipRecord::default();
    collect_relationships(&tree.root_node(), source, None, &mut record);
    Ok(record)
}

/// Reduce an edit snippet to the names it introduces or assigns. The
/// snippet need not be a complete file, only parseable on its own.
pub fn extract_modified_elements(snippet: &str) -> Result<ModifiedElements, DocError> {
    let tree = parse_python(snippet, "edit snippet")?;
    let mut modified = ModifiedElements::default();
    collect_modified(&tree.root_node(), snippet, &mut modified);
    Ok(modified)
}

/// Reduce an edit snippet to everything impact analysis needs: the
/// modified elements and the calls made by the edit's new functions.
pub fn analyze_edit(snippet: &str) -> Result<EditAnalysis, DocError> {
    let modified = extract_modified_elements(snippet)?;
    let record = extract_relationships(snippet, "edit snippet")?;
    let calls = record
        .functions
        .into_values()
        .flat_map(|f| f.calls)
        .collect();
    Ok(EditAnalysis { modified, calls })
}

fn parse_python(source: &str, what: &str) -> Result<tree_sitter::Tree, DocError> {
    let lang: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&lang)
        .map_err(|e| DocError::parse(what, e.to_string()))?;
    let tree = parser
        .parse(source.as_bytes(), None)
        .ok_or_else(|| DocError::parse(what, "tree-sitter produced no parse tree"))?;
    if tree.root_node().has_error() {
        return Err(DocError::parse(what, "invalid Python syntax"));
    }
    Ok(tree)
}

/// Structural recursion over the AST. Scope is carried as a parameter
/// (`current_fn` is the innermost enclosing function), so no state is
/// shared across traversal frames.
fn collect_relationships(
    node: &tree_sitter::Node,
    source: &str,
    current_fn: Option<&str>,
    record: &mut RelationshipRecord,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "import_statement" | "import_from_statement" => {
                record
                    .imports
                    .extend(parse_import(&source[child.byte_range()]));
            }
            "function_definition" => {
                if let Some(name_node) = child.child_by_field_name("name") {
                    let name = &source[name_node.byte_range()];
                    record.functions.insert(
                        name.to_string(),
                        FunctionRecord {
                            defined_at_line: child.start_position().row + 1,
                            ..FunctionRecord::default()
                        },
                    );
                    collect_relationships(&child, source, Some(name), record);
                }
            }
            "call" => {
                if let Some(func) = child.child_by_field_name("function")
                    && func.kind() == "identifier"
                    && let Some(current) = current_fn
                    && let Some(rec) = record.functions.get_mut(current)
                {
                    rec.calls.insert(source[func.byte_range()].to_string());
                }
                collect_relationships(&child, source, current_fn, record);
            }
            "assignment" => {
                if let Some(left) = child.child_by_field_name("left") {
                    let mut names = Vec::new();
                    collect_target_names(&left, source, &mut names);
                    match current_fn.and_then(|f| record.functions.get_mut(f)) {
                        Some(rec) => rec.variables.extend(names),
                        None => record.variables.extend(names),
                    }
                }
                collect_relationships(&child, source, current_fn, record);
            }
            _ => collect_relationships(&child, source, current_fn, record),
        }
    }
}

fn collect_modified(node: &tree_sitter::Node, source: &str, modified: &mut ModifiedElements) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "import_statement" | "import_from_statement" => {
                modified
                    .imports
                    .extend(parse_import(&source[child.byte_range()]));
            }
            "function_definition" => {
                if let Some(name_node) = child.child_by_field_name("name") {
                    modified
                        .functions
                        .insert(source[name_node.byte_range()].to_string());
                }
                collect_modified(&child, source, modified);
            }
            "class_definition" => {
                if let Some(name_node) = child.child_by_field_name("name") {
                    modified
                        .classes
                        .insert(source[name_node.byte_range()].to_string());
                }
                collect_modified(&child, source, modified);
            }
            "assignment" => {
                if let Some(left) = child.child_by_field_name("left") {
                    let mut names = Vec::new();
                    collect_target_names(&left, source, &mut names);
                    modified.variables.extend(names);
                }
                collect_modified(&child, source, modified);
            }
            _ => collect_modified(&child, source, modified),
        }
    }
}

/// Pull plain-identifier targets out of an assignment's left side.
/// Attribute and subscript targets are ignored, matching the heuristic.
fn collect_target_names(node: &tree_sitter::Node, source: &str, names: &mut Vec<String>) {
    match node.kind() {
        "identifier" => names.push(source[node.byte_range()].to_string()),
        "pattern_list" | "tuple_pattern" | "list_pattern" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                collect_target_names(&child, source, names);
            }
        }
        _ => {}
    }
}

/// Parse one import statement's text into qualified names.
/// `from m import a, b` yields `m.a`, `m.b`; aliases are dropped in favor
/// of the imported name.
fn parse_import(text: &str) -> Vec<String> {
    let text = text.trim();
    if let Some(rest) = text.strip_prefix("from ") {
        let Some((module, names)) = rest.split_once(" import ") else {
            return Vec::new();
        };
        let module = module.trim();
        return split_import_names(names)
            .map(|name| {
                if module.is_empty() {
                    name.to_string()
                } else {
                    format!("{module}.{name}")
                }
            })
            .collect();
    }
    if let Some(rest) = text.strip_prefix("import ") {
        return split_import_names(rest).map(String::from).collect();
    }
    Vec::new()
}

/// Split a comma-separated import list, dropping `as` aliases and any
/// parenthesized-continuation punctuation.
fn split_import_names(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').filter_map(|part| {
        let name = part
            .trim()
            .trim_matches(|c| c == '(' || c == ')' || c == '\\')
            .trim()
            .split_whitespace()
            .next()?;
        (!name.is_empty()).then_some(name)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_import_plain() {
        assert_eq!(parse_import("import os, sys"), vec!["os", "sys"]);
    }

    #[test]
    fn test_parse_import_from_with_alias() {
        assert_eq!(
            parse_import("from os.path import join as j, exists"),
            vec!["os.path.join", "os.path.exists"]
        );
    }

    #[test]
    fn test_parse_import_parenthesized() {
        assert_eq!(
            parse_import("from models import (User,\n    Role)"),
            vec!["models.User", "models.Role"]
        );
    }

    #[test]
    fn test_modified_elements_collects_all_scopes() {
        let snippet = "import database\n\nTIMEOUT = 30\n\nclass Handler:\n    def run(self):\n        result = fetch()\n";
        let modified = extract_modified_elements(snippet).unwrap();
        assert!(modified.imports.contains("database"));
        assert!(modified.classes.contains("Handler"));
        assert!(modified.functions.contains("run"));
        assert!(modified.variables.contains("TIMEOUT"));
        assert!(
            modified.variables.contains("result"),
            "edit variables are collected regardless of scope"
        );
    }

    #[test]
    fn test_malformed_snippet_is_a_parse_error() {
        let err = extract_modified_elements("def broken(:\n").unwrap_err();
        assert!(matches!(err, DocError::ParseError { .. }));
    }
}
