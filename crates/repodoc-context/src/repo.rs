//! Repository root discovery.

use std::path::{Path, PathBuf};

const REPO_MARKER: &str = ".git";

/// Walk upward from `path` through parent directories until one contains
/// the repository marker. Absence up to the filesystem root is `None`,
/// not an error.
pub fn find_repo_root(path: &Path) -> Option<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(path)
    };
    let mut current = if absolute.is_dir() {
        absolute.as_path()
    } else {
        absolute.parent()?
    };
    loop {
        if current.join(REPO_MARKER).is_dir() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_finds_root_from_nested_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join(".git")).unwrap();
        std::fs::create_dir_all(tmp.path().join("src/pkg")).unwrap();
        let file = tmp.path().join("src/pkg/mod.py");
        std::fs::write(&file, "x = 1\n").unwrap();

        assert_eq!(find_repo_root(&file), Some(tmp.path().to_path_buf()));
    }

    #[test]
    fn test_repo_dir_itself_resolves() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join(".git")).unwrap();
        assert_eq!(find_repo_root(tmp.path()), Some(tmp.path().to_path_buf()));
    }

    #[test]
    fn test_no_marker_is_none() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("lonely.py");
        std::fs::write(&file, "x = 1\n").unwrap();
        assert_eq!(find_repo_root(&file), None);
    }
}
