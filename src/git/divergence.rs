//! Ahead/behind counting between a branch and its tracking reference
//!
//! Both histories are walked in full and compared as sets. This is exact regardless of
//! merge topology but costs time linear in history size; a merge-base bounded walk
//! would be the optimization if deep histories become a problem.

use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;

use super::operations::{reachable_commits, ref_exists};
use crate::core::config::DEFAULT_REMOTE;

/// Name of the remote tracking reference for a local branch
pub fn tracking_ref(branch: &str) -> String {
    format!("refs/remotes/{DEFAULT_REMOTE}/{branch}")
}

/// Returns (ahead, behind): commits only in `local`, commits only in `remote`
pub fn count_divergence(local: &HashSet<String>, remote: &HashSet<String>) -> (usize, usize) {
    (
        local.difference(remote).count(),
        remote.difference(local).count(),
    )
}

/// Computes (ahead, behind) of HEAD relative to the tracking reference of `branch`
///
/// Returns `None` when there is nothing to compare: the branch has no tracking
/// reference yet or HEAD has no commits.
pub async fn ahead_behind(path: &Path, branch: &str) -> Result<Option<(usize, usize)>> {
    let tracking = tracking_ref(branch);
    let (has_tracking, has_head) =
        tokio::try_join!(ref_exists(path, &tracking), ref_exists(path, "HEAD"))?;
    if !has_tracking || !has_head {
        log::debug!(
            "{}: no divergence baseline for {branch} (tracking={has_tracking}, head={has_head})",
            path.display()
        );
        return Ok(None);
    }

    let (local, remote) = tokio::try_join!(
        reachable_commits(path, "HEAD"),
        reachable_commits(path, &tracking)
    )?;
    Ok(Some(count_divergence(&local, &remote)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commits(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_tracking_ref_uses_origin() {
        assert_eq!(tracking_ref("feature/x"), "refs/remotes/origin/feature/x");
    }

    #[test]
    fn test_identical_histories() {
        let history = commits(&["a", "b", "c"]);
        assert_eq!(count_divergence(&history, &history), (0, 0));
    }

    #[test]
    fn test_local_ahead() {
        let local = commits(&["a", "b", "c", "d"]);
        let remote = commits(&["a", "b"]);
        assert_eq!(count_divergence(&local, &remote), (2, 0));
    }

    #[test]
    fn test_diverged_histories() {
        let local = commits(&["a", "b", "x"]);
        let remote = commits(&["a", "b", "y", "z"]);
        assert_eq!(count_divergence(&local, &remote), (1, 2));
    }

    #[test]
    fn test_unrelated_histories() {
        let local = commits(&["a"]);
        let remote = commits(&["b", "c"]);
        assert_eq!(count_divergence(&local, &remote), (1, 2));
    }
}
