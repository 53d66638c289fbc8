use repodoc_core::error::DocError;
use repodoc_parser::builder::build_graph;
use repodoc_parser::extract::extract_relationships;

#[test]
fn test_imports_recorded_in_source_order() {
    let source = "\
import os
from pathlib import Path
from typing import Dict, Optional
";
    let record = extract_relationships(source, "test.py").unwrap();
    assert_eq!(
        record.imports,
        vec!["os", "pathlib.Path", "typing.Dict", "typing.Optional"]
    );
}

#[test]
fn test_function_calls_are_bare_identifiers_only() {
    let source = "\
def process():
    data = fetch()
    data.save()
    logger.info(data)
";
    let record = extract_relationships(source, "test.py").unwrap();
    let func = record.functions.get("process").unwrap();
    assert!(func.calls.contains("fetch"));
    assert!(
        !func.calls.contains("save") && !func.calls.contains("info"),
        "attribute calls are not resolved"
    );
}

#[test]
fn test_module_level_calls_are_not_recorded() {
    let source = "\
setup()

def run():
    helper()
";
    let record = extract_relationships(source, "test.py").unwrap();
    let all_calls: Vec<_> = record
        .functions
        .values()
        .flat_map(|f| f.calls.iter())
        .collect();
    assert_eq!(all_calls, vec!["helper"]);
}

#[test]
fn test_variable_scoping() {
    let source = "\
CONFIG = load()

def handle():
    result = compute()
    total, rest = split(result)
";
    let record = extract_relationships(source, "test.py").unwrap();
    assert!(record.variables.contains("CONFIG"));
    assert!(
        !record.variables.contains("result"),
        "function-local assignments stay out of the module set"
    );
    let func = record.functions.get("handle").unwrap();
    assert!(func.variables.contains("result"));
    assert!(func.variables.contains("total"));
    assert!(func.variables.contains("rest"));
}

#[test]
fn test_nested_function_attribution() {
    let source = "\
def outer():
    def inner():
        deep_call()
    outer_call()
";
    let record = extract_relationships(source, "test.py").unwrap();
    assert!(record.functions.get("inner").unwrap().calls.contains("deep_call"));
    assert!(record.functions.get("outer").unwrap().calls.contains("outer_call"));
    assert!(!record.functions.get("outer").unwrap().calls.contains("deep_call"));
}

#[test]
fn test_methods_keyed_by_bare_name() {
    let source = "\
class Service:
    def start(self):
        boot()
";
    let record = extract_relationships(source, "test.py").unwrap();
    let start = record.functions.get("start").unwrap();
    assert!(start.calls.contains("boot"));
    assert_eq!(start.defined_at_line, 2);
}

#[test]
fn test_defined_at_line() {
    let source = "import os\n\n\ndef late():\n    pass\n";
    let record = extract_relationships(source, "test.py").unwrap();
    assert_eq!(record.functions.get("late").unwrap().defined_at_line, 4);
}

#[test]
fn test_syntax_error_is_parse_error() {
    let err = extract_relationships("def broken(:\n", "broken.py").unwrap_err();
    assert!(matches!(err, DocError::ParseError { .. }));
}

#[test]
fn test_extraction_is_deterministic() {
    let source = "\
import b
import a

def f():
    z = 1
    y = 2
    call_two()
    call_one()
";
    let first = extract_relationships(source, "test.py").unwrap();
    let second = extract_relationships(source, "test.py").unwrap();
    assert_eq!(first, second);
}

mod graph_builder {
    use super::*;
    use repodoc_core::config::ScanConfig;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_graph_keys_are_root_relative() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("pkg")).unwrap();
        fs::write(tmp.path().join("app.py"), "import pkg.helpers\n").unwrap();
        fs::write(tmp.path().join("pkg/helpers.py"), "def assist():\n    pass\n").unwrap();

        let graph = build_graph(tmp.path(), &ScanConfig::default()).unwrap();
        assert_eq!(graph.len(), 2);
        assert!(graph.get("app.py").is_some());
        assert!(graph.get("pkg/helpers.py").is_some());
    }

    #[test]
    fn test_parse_failure_skips_only_that_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("good.py"), "def ok():\n    pass\n").unwrap();
        fs::write(tmp.path().join("bad.py"), "def broken(:\n").unwrap();

        let graph = build_graph(tmp.path(), &ScanConfig::default()).unwrap();
        assert!(graph.get("good.py").is_some());
        assert!(graph.get("bad.py").is_none());
    }

    #[test]
    fn test_excluded_dirs_are_pruned() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(".venv")).unwrap();
        fs::write(tmp.path().join("main.py"), "x = 1\n").unwrap();
        fs::write(tmp.path().join(".venv/site.py"), "y = 2\n").unwrap();

        let graph = build_graph(tmp.path(), &ScanConfig::default()).unwrap();
        assert_eq!(graph.len(), 1);
        assert!(graph.get("main.py").is_some());
    }

    #[test]
    fn test_empty_repo_is_analysis_unavailable() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("README.md"), "# no python here\n").unwrap();

        let err = build_graph(tmp.path(), &ScanConfig::default()).unwrap_err();
        assert!(matches!(err, DocError::AnalysisUnavailable { .. }));
    }

    #[test]
    fn test_build_is_deterministic() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.py"), "def f():\n    g()\n").unwrap();
        fs::write(tmp.path().join("b.py"), "def g():\n    pass\n").unwrap();

        let first = build_graph(tmp.path(), &ScanConfig::default()).unwrap();
        let second = build_graph(tmp.path(), &ScanConfig::default()).unwrap();
        assert_eq!(first, second);
    }
}
