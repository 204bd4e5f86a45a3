//! Basic read-only git operations and command execution

use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;

use crate::core::config::LOCAL_BRANCH_PREFIX;

// Git command arguments
const GIT_IS_BARE_ARGS: &[&str] = &["rev-parse", "--is-bare-repository"];
const GIT_SYMBOLIC_REF_ARGS: &[&str] = &["symbolic-ref", "--quiet", "HEAD"];
const GIT_VERIFY_ARGS: &[&str] = &["rev-parse", "--verify", "--quiet"];
const GIT_REMOTE_ARGS: &[&str] = &["remote"];
const GIT_REV_LIST_ARGS: &[&str] = &["rev-list"];
const GIT_STATUS_PORCELAIN_ARGS: &[&str] =
    &["status", "--porcelain=v1", "-z", "--untracked-files=normal"];
const GIT_CONFIG_LOCAL_GET_ARGS: &[&str] = &["config", "--local", "--get"];

/// What HEAD points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// Symbolic reference to a local branch (possibly unborn), holding its short name
    Branch(String),
    /// HEAD holds a commit id directly
    Detached,
}

/// Runs git in `path` and returns the raw process output
///
/// Children are killed when the returned future is dropped, so a caller that abandons
/// the call (timeout, cancellation) never leaves git processes behind. Repository
/// discovery is stopped at `path` so a plain directory is never mistaken for part of an
/// enclosing repository, and optional locks are disabled because nothing here writes.
pub(crate) async fn git_output(path: &Path, args: &[&str]) -> Result<Output> {
    let mut command = Command::new("git");
    command
        .args(args)
        .current_dir(path)
        .env("GIT_OPTIONAL_LOCKS", "0")
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .kill_on_drop(true);
    if let Some(parent) = path.parent() {
        command.env("GIT_CEILING_DIRECTORIES", parent);
    }

    log::trace!("git {} (in {})", args.join(" "), path.display());
    Ok(command.output().await?)
}

/// Runs a git command in the specified directory
/// Returns (success, stdout, stderr) with surrounding whitespace trimmed
pub async fn run_git(path: &Path, args: &[&str]) -> Result<(bool, String, String)> {
    let output = git_output(path, args).await?;
    Ok((
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).trim().to_string(),
        String::from_utf8_lossy(&output.stderr).trim().to_string(),
    ))
}

/// Opens `path` as a repository and reports whether it is bare
pub async fn open_repository(path: &Path) -> Result<bool> {
    match run_git(path, GIT_IS_BARE_ARGS).await? {
        (true, output, _) => Ok(output == "true"),
        (false, _, stderr) => Err(anyhow::anyhow!(first_line(&stderr))),
    }
}

/// Short name of a symbolic HEAD target
///
/// Only the `refs/heads/` prefix is removed; `--short` would abbreviate to
/// `heads/<name>` whenever a tag or remote ref shares the name.
fn branch_name(head_ref: &str) -> &str {
    head_ref
        .strip_prefix(LOCAL_BRANCH_PREFIX)
        .unwrap_or(head_ref)
}

/// Reads HEAD and reports whether it names a branch
pub async fn read_head(path: &Path) -> Result<Head> {
    let (on_branch, head_ref, stderr) = run_git(path, GIT_SYMBOLIC_REF_ARGS).await?;
    if on_branch && !head_ref.is_empty() {
        return Ok(Head::Branch(branch_name(&head_ref).to_string()));
    }

    // Not symbolic: either detached or HEAD is unreadable
    if ref_exists(path, "HEAD").await? {
        return Ok(Head::Detached);
    }

    let reason = if stderr.is_empty() {
        "HEAD does not resolve to a branch or commit".to_string()
    } else {
        first_line(&stderr)
    };
    Err(anyhow::anyhow!(reason))
}

/// Lists configured remote names
pub async fn list_remotes(path: &Path) -> Result<Vec<String>> {
    match run_git(path, GIT_REMOTE_ARGS).await? {
        (true, output, _) => Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()),
        (false, _, stderr) => Err(anyhow::anyhow!(first_line(&stderr))),
    }
}

/// Checks whether `reference` resolves to an object
pub async fn ref_exists(path: &Path, reference: &str) -> Result<bool> {
    let mut args = Vec::from(GIT_VERIFY_ARGS);
    args.push(reference);

    let (exists, _, _) = run_git(path, &args).await?;
    Ok(exists)
}

/// Collects the ids of every commit reachable from `rev`
pub async fn reachable_commits(path: &Path, rev: &str) -> Result<HashSet<String>> {
    let mut args = Vec::from(GIT_REV_LIST_ARGS);
    args.push(rev);
    args.push("--");

    match run_git(path, &args).await? {
        (true, output, _) => Ok(output
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()),
        (false, _, stderr) => Err(anyhow::anyhow!(
            "cannot walk history from {rev}: {}",
            first_line(&stderr)
        )),
    }
}

/// Reads a repository-local git config value
/// Returns the config value if it exists, None if not found
pub(crate) async fn get_local_git_config(path: &Path, key: &str) -> Result<Option<String>> {
    let mut args = Vec::from(GIT_CONFIG_LOCAL_GET_ARGS);
    args.push(key);

    match run_git(path, &args).await? {
        (true, value, _) if !value.is_empty() => Ok(Some(value)),
        _ => Ok(None), // Key not found
    }
}

/// Returns the raw NUL-separated porcelain status of the working tree
///
/// When `excludes_file` is given it is passed as `core.excludesFile`, unless the
/// repository configures its own.
pub async fn porcelain_status(path: &Path, excludes_file: Option<&Path>) -> Result<Vec<u8>> {
    let mut override_arg = None;
    if let Some(file) = excludes_file {
        if get_local_git_config(path, "core.excludesFile").await?.is_none() {
            override_arg = Some(format!("core.excludesFile={}", file.display()));
        }
    }

    let mut args: Vec<&str> = Vec::new();
    if let Some(arg) = override_arg.as_deref() {
        args.extend(["-c", arg]);
    }
    args.extend_from_slice(GIT_STATUS_PORCELAIN_ARGS);

    let output = git_output(path, &args).await?;
    if !output.status.success() {
        anyhow::bail!(first_line(&String::from_utf8_lossy(&output.stderr)));
    }
    Ok(output.stdout)
}

/// First non-empty line of a git error message
fn first_line(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("git command failed")
        .to_string()
}
