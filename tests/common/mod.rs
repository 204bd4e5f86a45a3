//! Common test utilities and helpers
#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod git;

pub use self::fixtures::{TestRepo, TestRepoBuilder, Workspace};
pub use self::git::{
    clone_repo, create_commits, create_multiple_repos, git, is_git_available, setup_git_repo,
};

