//! Hierarchy node shared by the builder and the renderer

use std::path::PathBuf;

use crate::core::config::ROOT_LABEL;
use crate::core::{Repository, ValidationError};

/// One line of the rendered tree
///
/// A node either holds a discovered repository or is a synthetic directory standing in
/// for a path segment between the root and a repository.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreeNode {
    /// Display name: the path segment, or the repository name
    pub name: String,
    /// Absolute path of the directory this node stands for
    pub path: PathBuf,
    /// Slash-separated path relative to the scan root; `.` for the root itself
    pub relative_path: String,
    /// 0 for the root, parent depth + 1 otherwise
    pub depth: usize,
    /// Whether this node is the last child of its parent
    pub is_last: bool,
    /// `None` for the root and for synthetic directory nodes
    pub repository: Option<Repository>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Root node labelled `.`
    pub fn root(path: impl Into<PathBuf>) -> Self {
        Self {
            name: ROOT_LABEL.to_string(),
            path: path.into(),
            relative_path: ROOT_LABEL.to_string(),
            ..Self::default()
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.repository.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Sorts children by name and updates their `is_last` flags
    pub fn sort_children(&mut self) {
        self.children.sort_by(|a, b| a.name.cmp(&b.name));
        let count = self.children.len();
        for (index, child) in self.children.iter_mut().enumerate() {
            child.is_last = index + 1 == count;
        }
    }

    /// Checks depth consistency and relative paths throughout the subtree
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.relative_path.is_empty() {
            return Err(ValidationError::EmptyRelativePath(self.path.clone()));
        }
        for child in &self.children {
            if child.depth != self.depth + 1 {
                return Err(ValidationError::DepthMismatch {
                    name: child.name.clone(),
                    expected: self.depth + 1,
                    actual: child.depth,
                });
            }
            child.validate()?;
        }
        Ok(())
    }

    /// Number of repository nodes in the subtree
    pub fn repository_count(&self) -> usize {
        let own = usize::from(self.repository.is_some());
        own + self
            .children
            .iter()
            .map(TreeNode::repository_count)
            .sum::<usize>()
    }
}
