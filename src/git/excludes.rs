//! Global excludes file lookup
//!
//! Resolution follows git: `core.excludesFile` from `~/.gitconfig`, then from
//! `$XDG_CONFIG_HOME/git/config`, then the default `$XDG_CONFIG_HOME/git/ignore`
//! (`~/.config/git/ignore` when the variable is unset).

use ignore::gitignore::{gitconfig_excludes_path, Gitignore};
use std::path::{Path, PathBuf};

/// Resolved global excludes file and the number of patterns it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalExcludes {
    pub path: PathBuf,
    pub pattern_count: u64,
}

/// Locates and loads the user's global excludes file
///
/// Returns `None` when no file is configured or it does not exist. A file that exists
/// but has unparsable lines is still returned; git skips bad patterns the same way.
pub fn load_global_excludes() -> Option<GlobalExcludes> {
    let Some(path) = gitconfig_excludes_path() else {
        log::debug!("no global excludes location could be determined");
        return None;
    };
    load_excludes_file(&path)
}

/// Loads a specific excludes file
pub fn load_excludes_file(path: &Path) -> Option<GlobalExcludes> {
    if !path.is_file() {
        log::debug!("global excludes not found at {}", path.display());
        return None;
    }

    let (matcher, error) = Gitignore::new(path);
    if let Some(error) = error {
        log::debug!("partially parsed {}: {error}", path.display());
    }
    let pattern_count = matcher.num_ignores() + matcher.num_whitelists();
    log::debug!(
        "loaded {pattern_count} patterns from global excludes {}",
        path.display()
    );

    Some(GlobalExcludes {
        path: path.to_path_buf(),
        pattern_count,
    })
}
