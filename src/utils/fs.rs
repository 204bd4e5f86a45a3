//! File system utilities

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Turns the user-supplied scan root into an absolute path
///
/// No path means the current directory. The path is not canonicalized, so symlinked
/// roots keep the name the user typed.
pub fn resolve_root(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => std::path::absolute(path)
            .with_context(|| format!("Failed to resolve path {}", path.display())),
        None => std::env::current_dir().context("Failed to get current directory"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_path_unchanged() {
        let root = resolve_root(Some(Path::new("/srv/code"))).unwrap();
        assert_eq!(root, PathBuf::from("/srv/code"));
    }

    #[test]
    fn test_relative_path_made_absolute() {
        let root = resolve_root(Some(Path::new("projects"))).unwrap();
        assert!(root.is_absolute());
        assert!(root.ends_with("projects"));
    }

    #[test]
    fn test_default_is_current_dir() {
        let root = resolve_root(None).unwrap();
        assert_eq!(root, std::env::current_dir().unwrap());
    }
}
