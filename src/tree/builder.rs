//! Flat repository list to hierarchy

use std::path::{Component, Path};

use super::node::TreeNode;
use crate::core::config::ROOT_LABEL;
use crate::core::Repository;

/// Builds the display hierarchy for `repositories` found under `root`
///
/// Every path segment between the root and a repository becomes a synthetic node
/// unless a node of that name already exists. Children are sorted by name at every
/// level, so the result does not depend on the input order.
pub fn build(root: &Path, repositories: &[Repository]) -> TreeNode {
    let mut tree = TreeNode::root(root);

    for repo in repositories {
        let Ok(relative) = repo.path.strip_prefix(root) else {
            log::debug!(
                "skipping {}: not under {}",
                repo.path.display(),
                root.display()
            );
            continue;
        };
        let segments = path_segments(relative);
        insert(&mut tree, repo, &segments);
    }

    finalize(&mut tree, 0);
    tree
}

/// Normal components of a relative path as display strings
fn path_segments(relative: &Path) -> Vec<String> {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

fn insert(tree: &mut TreeNode, repo: &Repository, segments: &[String]) {
    // A repository at the root itself hangs under the root by its own name
    let Some((leaf, parents)) = segments.split_last() else {
        tree.children.push(TreeNode {
            name: repo.name.clone(),
            path: repo.path.clone(),
            relative_path: ROOT_LABEL.to_string(),
            repository: Some(repo.clone()),
            ..TreeNode::default()
        });
        return;
    };

    let mut current = tree;
    for (index, segment) in parents.iter().enumerate() {
        let position = match current.children.iter().position(|c| &c.name == segment) {
            Some(position) => position,
            None => {
                current.children.push(TreeNode {
                    name: segment.clone(),
                    path: current.path.join(segment),
                    relative_path: segments[..=index].join("/"),
                    ..TreeNode::default()
                });
                current.children.len() - 1
            }
        };
        current = &mut current.children[position];
    }

    // A nested repository listed first already created this node as a parent
    if let Some(existing) = current.children.iter_mut().find(|c| &c.name == leaf) {
        existing.path = repo.path.clone();
        existing.repository = Some(repo.clone());
        return;
    }

    current.children.push(TreeNode {
        name: leaf.clone(),
        path: repo.path.clone(),
        relative_path: segments.join("/"),
        repository: Some(repo.clone()),
        ..TreeNode::default()
    });
}

/// Sorts every level and assigns depths top-down
fn finalize(node: &mut TreeNode, depth: usize) {
    node.depth = depth;
    node.sort_children();
    for child in &mut node.children {
        finalize(child, depth + 1);
    }
}
