//! Test fixtures and builders

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::git::{
    add_git_remote, clone_repo, create_commits, create_stash, create_test_commit, git,
    setup_bare_repo, setup_git_repo,
};

/// A scan root holding any number of test repositories, removed on drop
pub struct Workspace {
    pub temp_dir: TempDir,
}

impl Workspace {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Get the path to the workspace root
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Creates the directories of `relative` and returns the absolute path
    pub fn dir(&self, relative: &str) -> Result<PathBuf> {
        let path = self.path().join(relative);
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Builds a repository at `relative` from `builder`
    pub fn repo(&self, relative: &str, builder: TestRepoBuilder) -> Result<PathBuf> {
        let path = self.dir(relative)?;
        builder.build_at(&path)?;
        Ok(path)
    }

    /// Clones the repository at `source` (relative) into `dest` (relative)
    pub fn clone_of(&self, source: &str, dest: &str) -> Result<PathBuf> {
        let dest_path = self.path().join(dest);
        if let Some(parent) = dest_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        clone_repo(&self.path().join(source), &dest_path)?;
        Ok(dest_path)
    }

    /// Creates a bare repository at `relative`
    pub fn bare(&self, relative: &str) -> Result<PathBuf> {
        let path = self.dir(relative)?;
        setup_bare_repo(&path)?;
        Ok(path)
    }
}

/// A standalone test repository with automatic cleanup
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub name: String,
}

impl TestRepo {
    /// Get the path to the repository
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a new file in the repository
    pub fn create_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let file_path = self.path().join(name);
        std::fs::write(&file_path, content)?;
        Ok(file_path)
    }

    /// Commit all changes in the repository
    pub fn commit_all(&self, message: &str) -> Result<()> {
        git(self.path(), &["add", "."])?;
        git(self.path(), &["commit", "--quiet", "-m", message])?;
        Ok(())
    }
}

/// Builder for creating test repositories
pub struct TestRepoBuilder {
    name: String,
    with_remote: Option<String>,
    with_commits: usize,
    with_stash: bool,
    untracked: Vec<String>,
    staged: Vec<String>,
}

impl TestRepoBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            with_remote: None,
            with_commits: 1,
            with_stash: false,
            untracked: Vec::new(),
            staged: Vec::new(),
        }
    }

    /// Adds `origin` pointing at `url` (nothing is fetched)
    pub fn with_remote(mut self, url: impl Into<String>) -> Self {
        self.with_remote = Some(url.into());
        self
    }

    /// Total number of commits, including the initial one; zero leaves HEAD unborn
    pub fn with_commits(mut self, count: usize) -> Self {
        self.with_commits = count;
        self
    }

    pub fn with_stash(mut self) -> Self {
        self.with_stash = true;
        self
    }

    pub fn with_untracked(mut self, file: impl Into<String>) -> Self {
        self.untracked.push(file.into());
        self
    }

    pub fn with_staged(mut self, file: impl Into<String>) -> Self {
        self.staged.push(file.into());
        self
    }

    /// Builds the repository inside an existing directory
    pub fn build_at(&self, path: &Path) -> Result<()> {
        setup_git_repo(path)?;

        if self.with_commits > 0 {
            create_test_commit(path, "README.md", &format!("# {}", self.name), "Initial commit")?;
            create_commits(path, "file", self.with_commits - 1)?;
        }

        if let Some(remote_url) = &self.with_remote {
            add_git_remote(path, "origin", remote_url)?;
        }

        if self.with_stash {
            create_stash(path, "README.md")?;
        }

        for file in &self.staged {
            std::fs::write(path.join(file), "staged\n")?;
            git(path, &["add", file])?;
        }

        for file in &self.untracked {
            std::fs::write(path.join(file), "untracked\n")?;
        }

        Ok(())
    }

    /// Builds the repository in its own temporary directory
    pub fn build(self) -> Result<TestRepo> {
        let temp_dir = TempDir::new()?;
        self.build_at(temp_dir.path())?;
        Ok(TestRepo {
            temp_dir,
            name: self.name,
        })
    }
}
