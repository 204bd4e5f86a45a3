//! Shared scan entities: repositories, scan results and their diagnostics

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::config::UNKNOWN_BRANCH;
use crate::git::{ExtractError, Status};
use crate::tree::{self, TreeNode};

/// Violation of one of the data model's own consistency rules
///
/// These never describe user-facing conditions. Seeing one means a component built an
/// entity it should not have.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("path cannot be empty")]
    EmptyPath,
    #[error("path must be absolute: {}", .0.display())]
    RelativePath(PathBuf),
    #[error("name cannot be empty")]
    EmptyName,
    #[error("bare repository cannot have uncommitted changes")]
    BareWithChanges,
    #[error("branch cannot be empty")]
    EmptyBranch,
    #[error("detached HEAD must use the DETACHED branch sentinel, got {0:?}")]
    DetachedBranchMismatch(String),
    #[error("no remote but ahead/behind counts are non-zero ({ahead}/{behind})")]
    DivergenceWithoutRemote { ahead: usize, behind: usize },
    #[error("relative path cannot be empty for {}", .0.display())]
    EmptyRelativePath(PathBuf),
    #[error("node {name:?} has depth {actual}, expected {expected}")]
    DepthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("total repos mismatch: {reported} != {listed}")]
    RepoCountMismatch { listed: usize, reported: usize },
    #[error("total scanned < total repos: {scanned} < {repos}")]
    ScannedBelowRepos { scanned: usize, repos: usize },
}

/// Non-fatal problem met while walking the tree
///
/// The offending subtree is pruned and the scan carries on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanDiagnostic {
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("cannot read {}: {message}", .path.display())]
    Unreadable { path: PathBuf, message: String },
    #[error("broken symlink {}: {message}", .path.display())]
    BrokenSymlink { path: PathBuf, message: String },
    #[error("symlink {} does not point to a directory", .0.display())]
    SymlinkNotDirectory(PathBuf),
    #[error("scan cancelled before {} was visited", .0.display())]
    Cancelled(PathBuf),
}

impl Serialize for ScanDiagnostic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A git repository discovered during directory scanning
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Repository {
    /// Absolute path to the repository directory (unique key)
    pub path: PathBuf,
    /// Base name of the repository directory
    pub name: String,
    pub is_bare: bool,
    /// Whether the repository was reached through a symbolic link
    pub is_symlink: bool,
    /// Extracted status, `None` until attached or when extraction failed outright
    pub status: Option<Status>,
    /// Terminal error that prevented any status from being read
    pub error: Option<String>,
    pub has_timeout: bool,
}

impl Repository {
    pub fn new(path: impl Into<PathBuf>, is_bare: bool, is_symlink: bool) -> Self {
        let path = path.into();
        let name = base_name(&path);
        Self {
            path,
            name,
            is_bare,
            is_symlink,
            status: None,
            error: None,
            has_timeout: false,
        }
    }

    /// Checks the repository against its validation rules
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ValidationError::EmptyPath);
        }
        if !self.path.is_absolute() {
            return Err(ValidationError::RelativePath(self.path.clone()));
        }
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if let Some(status) = &self.status {
            if self.is_bare && status.has_changes {
                return Err(ValidationError::BareWithChanges);
            }
            status.validate()?;
        }
        Ok(())
    }

    /// Attaches the outcome of status extraction
    ///
    /// An open failure leaves the repository without a status and records the terminal
    /// error instead. A timed-out extraction keeps its placeholder status and raises the
    /// timeout flag.
    pub fn attach_status(&mut self, status: Status) {
        match &status.error {
            Some(ExtractError::Open(message)) => {
                self.error = Some(message.clone());
                self.status = None;
            }
            Some(ExtractError::Timeout(_)) => {
                self.has_timeout = true;
                self.status = Some(status);
            }
            _ => self.status = Some(status),
        }

        debug_assert!(
            self.validate().is_ok(),
            "invalid repository after status attach: {:?}",
            self.validate()
        );
    }

    /// Branch shown for this repository, falling back to the unknown sentinel
    pub fn branch(&self) -> &str {
        self.status
            .as_ref()
            .map_or(UNKNOWN_BRANCH, |status| status.branch.as_str())
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some() || self.has_timeout
    }
}

/// The complete result of a directory scan
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    /// Absolute path where the scan started
    pub root_path: PathBuf,
    pub repositories: Vec<Repository>,
    /// Hierarchy derived from `repositories`; rebuilt whenever statuses are attached
    #[serde(skip)]
    pub tree: TreeNode,
    /// Number of directories visited
    pub total_scanned: usize,
    pub total_repos: usize,
    pub errors: Vec<ScanDiagnostic>,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl ScanResult {
    pub fn new(
        root_path: PathBuf,
        repositories: Vec<Repository>,
        total_scanned: usize,
        errors: Vec<ScanDiagnostic>,
        duration: Duration,
    ) -> Self {
        let tree = tree::build(&root_path, &repositories);
        let total_repos = repositories.len();
        Self {
            root_path,
            repositories,
            tree,
            total_scanned,
            total_repos,
            errors,
            duration,
        }
    }

    /// Checks the result against its validation rules
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.root_path.as_os_str().is_empty() {
            return Err(ValidationError::EmptyPath);
        }
        if !self.root_path.is_absolute() {
            return Err(ValidationError::RelativePath(self.root_path.clone()));
        }
        if self.total_repos != self.repositories.len() {
            return Err(ValidationError::RepoCountMismatch {
                listed: self.repositories.len(),
                reported: self.total_repos,
            });
        }
        if self.total_scanned < self.total_repos {
            return Err(ValidationError::ScannedBelowRepos {
                scanned: self.total_scanned,
                repos: self.total_repos,
            });
        }
        for repo in &self.repositories {
            repo.validate()?;
        }
        self.tree.validate()
    }

    /// Returns true if there are non-fatal errors in the scan result
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Ratio of repositories whose status was read without a terminal error or timeout
    ///
    /// Returns 1.0 if there are no repositories.
    pub fn success_rate(&self) -> f64 {
        if self.total_repos == 0 {
            return 1.0;
        }

        let failed = self.repositories.iter().filter(|r| r.is_failed()).count();
        (self.total_repos - failed) as f64 / self.total_repos as f64
    }

    /// Populates repositories with extracted statuses and rebuilds the tree
    ///
    /// Repositories missing from `statuses` (abandoned by cancellation) stay without a
    /// status.
    pub fn attach_statuses(&mut self, mut statuses: HashMap<PathBuf, Status>) {
        for repo in &mut self.repositories {
            if let Some(status) = statuses.remove(&repo.path) {
                repo.attach_status(status);
            }
        }
        self.tree = tree::build(&self.root_path, &self.repositories);
    }

    pub fn repository_paths(&self) -> Vec<PathBuf> {
        self.repositories.iter().map(|r| r.path.clone()).collect()
    }
}

/// Last path component as a display name, or the whole path for roots like `/`
pub(crate) fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u128(duration.as_millis())
}
