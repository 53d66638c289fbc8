//! Full request flow against an on-disk repository fixture: graph
//! construction, bundle generation, caching, chunk access, and impact
//! analysis for proposed edits.

use repodoc_context::handler::DocHandler;
use repodoc_core::config::DocConfig;
use repodoc_core::relations::RiskLevel;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct Fixture {
    _cache_dir: TempDir,
    _repo_dir: TempDir,
    repo_root: PathBuf,
    handler: DocHandler,
}

impl Fixture {
    fn new() -> Self {
        let cache_dir = TempDir::new().unwrap();
        let repo_dir = TempDir::new().unwrap();
        let repo_root = repo_dir.path().to_path_buf();

        fs::create_dir(repo_root.join(".git")).unwrap();
        fs::write(
            repo_root.join("app.py"),
            "import database\n\
             import models\n\
             import utils\n\
             \n\
             def process_request(request):\n\
             \x20   user = get_user_data(request)\n\
             \x20   return format_response(user)\n",
        )
        .unwrap();
        fs::write(
            repo_root.join("database.py"),
            "def get_user_data(request):\n\
             \x20   return {'id': 1}\n",
        )
        .unwrap();
        fs::write(
            repo_root.join("models.py"),
            "class User:\n\
             \x20   def __init__(self):\n\
             \x20       self.id = 0\n",
        )
        .unwrap();
        fs::write(
            repo_root.join("utils.py"),
            "def format_response(user):\n\
             \x20   return str(user)\n",
        )
        .unwrap();

        let mut config = DocConfig::default();
        config.cache.cache_dir = Some(cache_dir.path().to_path_buf());
        let handler = DocHandler::new(config);

        Self {
            _cache_dir: cache_dir,
            _repo_dir: repo_dir,
            repo_root,
            handler,
        }
    }

    fn app_py(&self) -> PathBuf {
        self.repo_root.join("app.py")
    }
}

#[test]
fn request_builds_documentation_and_context() {
    let mut fx = Fixture::new();
    let response = fx.handler.request_documentation(&fx.app_py(), None).unwrap();

    assert_eq!(response.repo_root, fx.repo_root);
    let rendered = response.documentation.render();
    assert!(rendered.contains("Repository structure:"));
    assert!(rendered.contains("├── app.py"));
    assert!(rendered.contains("File contents:"));
    assert!(rendered.contains("def process_request"));
    // .git contents never appear in the bundle.
    assert!(!rendered.contains(".git"));

    let context = response.context.expect("app.py has a relationship record");
    assert_eq!(context.imports, vec!["database", "models", "utils"]);
    assert!(context.functions.contains_key("process_request"));

    assert!(response.impact.is_none());
    assert_eq!(
        response.metadata.get("has_cached_doc"),
        Some(&serde_json::Value::from(false))
    );
    assert_eq!(
        response.metadata.get("file_path"),
        Some(&serde_json::Value::from("app.py"))
    );
}

#[test]
fn response_includes_documentation_for_related_files() {
    let mut fx = Fixture::new();
    let response = fx
        .handler
        .request_documentation(&fx.repo_root.join("database.py"), None)
        .unwrap();

    // app.py imports database and calls get_user_data, so database.py's
    // relevant view carries app.py's section and nothing else.
    let context = response.context.expect("database.py has a record");
    assert!(context.related_files.contains("app.py"));

    let section = response
        .relevant_documentation
        .get("app.py")
        .expect("section for the related file");
    assert!(section.starts_with("File: app.py"));
    assert!(section.contains("def process_request"));
    assert!(!response.relevant_documentation.contains_key("models.py"));
}

#[test]
fn second_request_is_served_from_cache() {
    let mut fx = Fixture::new();
    let first = fx.handler.request_documentation(&fx.app_py(), None).unwrap();
    let second = fx.handler.request_documentation(&fx.app_py(), None).unwrap();

    assert_eq!(
        second.metadata.get("has_cached_doc"),
        Some(&serde_json::Value::from(true))
    );
    assert_eq!(
        first.documentation.render(),
        second.documentation.render()
    );
}

#[test]
fn edit_calling_foreign_functions_flags_their_definers() {
    let mut fx = Fixture::new();
    let edit = "def new_method():\n\
                \x20   user = get_user_data()\n\
                \x20   return format_response(user)\n";
    let response = fx
        .handler
        .request_documentation(&fx.app_py(), Some(edit))
        .unwrap();

    let impact = response.impact.expect("edit supplied");
    assert!(impact.affected_files.contains("database.py"));
    assert!(impact.affected_files.contains("utils.py"));
    assert!(!impact.affected_files.contains("models.py"));
    assert_eq!(impact.risk_level, RiskLevel::Medium);
    assert!(
        impact
            .warnings
            .iter()
            .any(|w| w.contains("get_user_data") && w.contains("database.py")),
        "warnings: {:?}",
        impact.warnings
    );
}

#[test]
fn edit_adding_an_import_raises_risk_to_high() {
    let mut fx = Fixture::new();
    let edit = "import database\n\
                \n\
                def new_method():\n\
                \x20   return database.get_user_data()\n";
    let response = fx
        .handler
        .request_documentation(&fx.app_py(), Some(edit))
        .unwrap();

    let impact = response.impact.expect("edit supplied");
    assert!(impact.affected_files.contains("database.py"));
    assert_eq!(impact.risk_level, RiskLevel::High);
}

#[test]
fn edit_to_a_function_called_elsewhere_flags_the_caller() {
    let mut fx = Fixture::new();
    // Edit database.py's get_user_data, which app.py calls.
    let edit = "def get_user_data(request):\n\
                \x20   return {'id': 2}\n";
    let response = fx
        .handler
        .request_documentation(&fx.repo_root.join("database.py"), Some(edit))
        .unwrap();

    let impact = response.impact.expect("edit supplied");
    assert!(impact.affected_files.contains("app.py"));
    assert!(
        impact
            .warnings
            .iter()
            .any(|w| w.contains("get_user_data") && w.contains("app.py"))
    );
}

#[test]
fn unparsable_edit_is_an_error() {
    let mut fx = Fixture::new();
    let err = fx
        .handler
        .request_documentation(&fx.app_py(), Some("def broken(:\n"))
        .unwrap_err();
    assert!(err.to_string().contains("invalid Python syntax"));
}

#[test]
fn file_outside_any_repository_is_rejected() {
    let mut fx = Fixture::new();
    let outside = TempDir::new().unwrap();
    let stray = outside.path().join("stray.py");
    fs::write(&stray, "x = 1\n").unwrap();

    let err = fx.handler.request_documentation(&stray, None).unwrap_err();
    assert!(matches!(
        err,
        repodoc_core::error::DocError::RepositoryNotFound { .. }
    ));
}

#[test]
fn chunks_are_retrievable_and_memoized() {
    let mut fx = Fixture::new();
    fx.handler.request_documentation(&fx.app_py(), None).unwrap();

    let root = fx.repo_root.clone();
    let chunk = fx.handler.get_chunk(&root, 0).expect("chunk 0 exists");
    assert!(!chunk.is_empty());
    // Second read comes from the in-memory copy and stays identical.
    assert_eq!(fx.handler.get_chunk(&root, 0), Some(chunk));
    assert_eq!(fx.handler.get_chunk(&root, 10_000), None);
}

#[test]
fn refresh_picks_up_new_files() {
    let mut fx = Fixture::new();
    let before = fx.handler.request_documentation(&fx.app_py(), None).unwrap();
    assert!(!before.documentation.render().contains("extra.py"));

    fs::write(fx.repo_root.join("extra.py"), "import app\n").unwrap();
    let root = fx.repo_root.clone();
    let bundle = fx.handler.refresh(&root).unwrap();
    assert!(bundle.render().contains("extra.py"));

    // The refreshed bundle is what later requests see.
    let after = fx.handler.request_documentation(&fx.app_py(), None).unwrap();
    assert!(after.documentation.render().contains("extra.py"));
    assert_eq!(
        after.metadata.get("has_cached_doc"),
        Some(&serde_json::Value::from(true))
    );
}

#[test]
fn refresh_of_a_non_repository_fails() {
    let mut fx = Fixture::new();
    let outside = TempDir::new().unwrap();
    let err = fx.handler.refresh(outside.path()).unwrap_err();
    assert!(matches!(
        err,
        repodoc_core::error::DocError::RepositoryNotFound { .. }
    ));
}
