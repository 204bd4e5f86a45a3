//! Repository status record and its degraded forms

use serde::{Serialize, Serializer};
use std::time::Duration;

use crate::core::config::{DETACHED_BRANCH, UNKNOWN_BRANCH};
use crate::core::ValidationError;

/// Why some or all of a status could not be read
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// The whole extraction was abandoned after its time budget ran out
    #[error("timeout")]
    Timeout(Duration),
    /// The path could not be opened as a repository; nothing else was read
    #[error("{0}")]
    Open(String),
    #[error("failed to read HEAD: {0}")]
    Branch(String),
    #[error("failed to list remotes: {0}")]
    Remotes(String),
    #[error("failed to compute ahead/behind: {0}")]
    Divergence(String),
    #[error("failed to get worktree status: {0}")]
    Worktree(String),
}

impl Serialize for ExtractError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Git status information for a single repository
///
/// Built by one extraction unit and never modified afterwards.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Status {
    /// Current branch name, `DETACHED` for a detached HEAD or `unknown` when unreadable
    pub branch: String,
    pub is_detached: bool,
    pub has_remote: bool,
    /// Commits reachable from HEAD but not from the tracking reference
    pub ahead: usize,
    /// Commits reachable from the tracking reference but not from HEAD
    pub behind: usize,
    pub has_stashes: bool,
    pub has_changes: bool,
    /// First error met while reading the status, if any
    pub error: Option<ExtractError>,
}

impl Status {
    /// Placeholder status for an extraction that produced no usable data
    pub fn degraded(error: ExtractError) -> Self {
        Self {
            branch: UNKNOWN_BRANCH.to_string(),
            error: Some(error),
            ..Self::default()
        }
    }

    /// Checks the status against its validation rules
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.branch.is_empty() {
            return Err(ValidationError::EmptyBranch);
        }
        if self.is_detached && self.branch != DETACHED_BRANCH {
            return Err(ValidationError::DetachedBranchMismatch(self.branch.clone()));
        }
        if !self.has_remote && (self.ahead != 0 || self.behind != 0) {
            return Err(ValidationError::DivergenceWithoutRemote {
                ahead: self.ahead,
                behind: self.behind,
            });
        }
        Ok(())
    }

    /// Records `error` unless an earlier step already reported one
    pub(crate) fn note_error(&mut self, error: ExtractError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.error, Some(ExtractError::Timeout(_)))
    }

    /// `main` and `master` are rendered in a muted style
    pub fn is_default_branch(&self) -> bool {
        self.branch == "main" || self.branch == "master"
    }

    /// One-line summary used by debug logging
    pub fn summary(&self) -> String {
        let mut parts = vec![
            format!("branch={}", self.branch),
            format!("hasChanges={}", self.has_changes),
        ];
        if self.has_remote {
            parts.push("hasRemote=true".to_string());
            if self.ahead > 0 {
                parts.push(format!("ahead={}", self.ahead));
            }
            if self.behind > 0 {
                parts.push(format!("behind={}", self.behind));
            }
        } else {
            parts.push("hasRemote=false".to_string());
        }
        if self.has_stashes {
            parts.push("hasStashes=true".to_string());
        }
        if let Some(error) = &self.error {
            parts.push(format!("error={error}"));
        }
        parts.join(", ")
    }
}
