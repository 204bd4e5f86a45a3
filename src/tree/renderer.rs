//! Line-drawing output for a built tree
//!
//! ```text
//! .
//! ├── api [[ main ]]
//! ├── tools
//! │   └── cli [[ feature/x | ↑2 ↓1 $ * ]]
//! └── mirror.git [[ main | ○ ]] bare
//! ```

use super::node::TreeNode;
use super::style::{Category, RenderStyle};
use crate::core::config::{NO_REPOS_MESSAGE, ROOT_LABEL, UNKNOWN_BRANCH};
use crate::core::Repository;
use crate::git::Status;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Renders the tree below `root`, one line per node, ending with a newline
///
/// A root without children renders as the no-repositories message.
pub fn format(root: &TreeNode, style: &RenderStyle) -> String {
    if root.children.is_empty() {
        return format!("{NO_REPOS_MESSAGE}\n");
    }

    let mut out = String::new();
    out.push_str(ROOT_LABEL);
    out.push('\n');
    format_children(&mut out, root, "", style);
    out
}

fn format_children(out: &mut String, node: &TreeNode, prefix: &str, style: &RenderStyle) {
    for child in &node.children {
        let (connector, continuation) = if child.is_last {
            (LAST_BRANCH, SPACE)
        } else {
            (BRANCH, PIPE)
        };

        out.push_str(prefix);
        out.push_str(connector);
        out.push_str(&child.name);
        if let Some(repo) = &child.repository {
            out.push_str(&annotate(repo, style));
        }
        out.push('\n');

        format_children(out, child, &format!("{prefix}{continuation}"), style);
    }
}

/// Text following a repository name, including the leading space
pub fn annotate(repo: &Repository, style: &RenderStyle) -> String {
    let mut text = String::new();

    if let Some(status) = &repo.status {
        text.push(' ');
        if repo.has_timeout || status.is_timeout() {
            text.push_str(&bracket(
                &style.paint(Category::OtherBranch, UNKNOWN_BRANCH),
                &[],
                style,
            ));
        } else {
            text.push_str(&status_block(status, repo.is_bare, style));
        }
    }

    if repo.is_bare {
        text.push_str(" bare");
    }
    let partial_error = repo
        .status
        .as_ref()
        .is_some_and(|s| s.error.is_some() && !s.is_timeout());
    if partial_error || (repo.status.is_none() && repo.error.is_some()) {
        text.push_str(" error");
    }
    if repo.has_timeout {
        text.push_str(" timeout");
    }

    text
}

/// `[[ branch | markers ]]` for a status that was actually read
fn status_block(status: &Status, is_bare: bool, style: &RenderStyle) -> String {
    let branch_category = if status.is_default_branch() {
        Category::DefaultBranch
    } else {
        Category::OtherBranch
    };
    let branch = style.paint(branch_category, &status.branch);

    let mut markers = Vec::new();
    if status.has_remote {
        if status.ahead > 0 {
            markers.push(style.paint(Category::Ahead, &format!("↑{}", status.ahead)));
        }
        if status.behind > 0 {
            markers.push(style.paint(Category::Behind, &format!("↓{}", status.behind)));
        }
    } else {
        markers.push(style.paint(Category::Muted, "○"));
    }
    if status.has_stashes {
        markers.push(style.paint(Category::Attention, "$"));
    }
    if status.has_changes && !is_bare {
        markers.push(style.paint(Category::Attention, "*"));
    }

    bracket(&branch, &markers, style)
}

fn bracket(branch: &str, markers: &[String], style: &RenderStyle) -> String {
    let open = style.paint(Category::Muted, "[[");
    let close = style.paint(Category::Muted, "]]");
    if markers.is_empty() {
        format!("{open} {branch} {close}")
    } else {
        let separator = style.paint(Category::Muted, "|");
        format!("{open} {branch} {separator} {} {close}", markers.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::ExtractError;
    use crate::tree::build;
    use anstream::adapter::strip_str;
    use std::path::Path;
    use std::time::Duration;

    fn repo_with(path: &str, status: Status) -> Repository {
        let mut repo = Repository::new(path, false, false);
        repo.status = Some(status);
        repo
    }

    fn status(branch: &str) -> Status {
        Status {
            branch: branch.to_string(),
            has_remote: true,
            ..Status::default()
        }
    }

    fn render(repos: &[Repository]) -> String {
        format(&build(Path::new("/root"), repos), &RenderStyle::plain())
    }

    #[test]
    fn test_empty_tree_message() {
        assert_eq!(render(&[]), "no repositories found\n");
    }

    #[test]
    fn test_single_repository() {
        let output = render(&[repo_with("/root/project", status("main"))]);
        assert_eq!(output, ".\n└── project [[ main ]]\n");
    }

    #[test]
    fn test_siblings_and_nesting_connectors() {
        let output = render(&[
            repo_with("/root/alpha", status("main")),
            repo_with("/root/group/inner", status("main")),
            repo_with("/root/group/zed", status("main")),
            repo_with("/root/omega", status("main")),
        ]);
        let expected = "\
.
├── alpha [[ main ]]
├── group
│   ├── inner [[ main ]]
│   └── zed [[ main ]]
└── omega [[ main ]]
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_last_branch_uses_blank_continuation() {
        let output = render(&[repo_with("/root/group/deep/app", status("main"))]);
        let expected = "\
.
└── group
    └── deep
        └── app [[ main ]]
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_all_markers_in_order() {
        let output = render(&[repo_with(
            "/root/project",
            Status {
                ahead: 2,
                behind: 1,
                has_stashes: true,
                has_changes: true,
                ..status("develop")
            },
        )]);
        assert!(output.contains("project [[ develop | ↑2 ↓1 $ * ]]"));
    }

    #[test]
    fn test_no_remote_marker_only() {
        let output = render(&[repo_with(
            "/root/proj1",
            Status {
                has_remote: false,
                ..status("main")
            },
        )]);
        assert_eq!(output, ".\n└── proj1 [[ main | ○ ]]\n");
    }

    #[test]
    fn test_detached_head() {
        let output = render(&[repo_with(
            "/root/proj",
            Status {
                is_detached: true,
                ..status("DETACHED")
            },
        )]);
        assert!(output.contains("proj [[ DETACHED ]]"));
    }

    #[test]
    fn test_bare_repository_never_shows_changes() {
        let mut repo = repo_with("/root/mirror.git", status("main"));
        repo.is_bare = true;
        // The renderer does not trust the flag for bare repositories
        repo.status.as_mut().unwrap().has_changes = true;

        let output = render(&[repo]);
        assert!(output.contains("mirror.git [[ main ]] bare"));
        assert!(!output.contains('*'));
    }

    #[test]
    fn test_partial_error_suffix() {
        let output = render(&[repo_with(
            "/root/broken",
            Status {
                error: Some(ExtractError::Worktree("index locked".to_string())),
                ..status("main")
            },
        )]);
        assert!(output.contains("broken [[ main ]] error"));
    }

    #[test]
    fn test_open_failure_shows_error_only() {
        let mut repo = Repository::new("/root/broken", false, false);
        repo.error = Some("not a git repository".to_string());
        assert_eq!(render(&[repo]), ".\n└── broken error\n");
    }

    #[test]
    fn test_timeout_suffix() {
        let mut repo = Repository::new("/root/slow", false, false);
        repo.attach_status(Status::degraded(ExtractError::Timeout(Duration::from_secs(10))));
        assert_eq!(render(&[repo]), ".\n└── slow [[ unknown ]] timeout\n");
    }

    #[test]
    fn test_repository_without_status_has_no_annotation() {
        let output = render(&[Repository::new("/root/pending", false, false)]);
        assert_eq!(output, ".\n└── pending\n");
    }

    #[test]
    fn test_colors_only_change_escapes() {
        let repos = [repo_with(
            "/root/project",
            Status {
                ahead: 3,
                has_changes: true,
                ..status("feature")
            },
        )];
        let tree = build(Path::new("/root"), &repos);
        let plain = format(&tree, &RenderStyle::plain());
        let colored = format(&tree, &RenderStyle::colored());

        assert!(!plain.contains('\x1b'));
        assert!(colored.contains('\x1b'));
        assert_eq!(strip_str(&colored).to_string(), plain);
    }
}
