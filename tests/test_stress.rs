use anyhow::Result;
use gitree::core::scan;
use gitree::git::{extract_batch, ExtractOptions};
use std::fs;
use std::process::Command;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

mod common;
use common::{git, is_git_available};

fn setup_many_repos(count: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    for i in 0..count {
        let repo_path = root.join(format!("repo-{i:03}"));
        fs::create_dir(&repo_path).unwrap();
        Command::new("git")
            .arg("init")
            .arg("-q")
            .current_dir(&repo_path)
            .output()
            .unwrap();

        // Add a remote that is never fetched
        Command::new("git")
            .args(["remote", "add", "origin", "https://github.com/example/repo.git"])
            .current_dir(&repo_path)
            .output()
            .unwrap();
    }

    temp_dir
}

#[tokio::test]
async fn test_stress_discovery_and_extraction() -> Result<()> {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return Ok(());
    }

    let count = 50;
    let temp_dir = setup_many_repos(count);

    // 1. Discovery
    let mut result = scan(temp_dir.path())?;
    assert_eq!(result.total_repos, count);

    // 2. Bounded concurrent extraction
    let options = ExtractOptions {
        max_concurrency: 4,
        ..ExtractOptions::default()
    };
    let statuses = extract_batch(
        &result.repository_paths(),
        &options,
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(statuses.len(), count, "Every path gets a status");
    assert!(statuses.values().all(|s| s.has_remote && s.error.is_none()));

    result.attach_statuses(statuses);
    assert!(result.validate().is_ok());
    assert_eq!(result.success_rate(), 1.0);

    Ok(())
}

#[tokio::test]
async fn test_single_permit_still_completes() -> Result<()> {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return Ok(());
    }

    let temp_dir = setup_many_repos(5);
    let result = scan(temp_dir.path())?;
    let options = ExtractOptions {
        max_concurrency: 1,
        ..ExtractOptions::default()
    };

    let statuses = extract_batch(
        &result.repository_paths(),
        &options,
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(statuses.len(), 5);
    Ok(())
}

/// Makes every `git status` in `repo_path` take at least a second
#[cfg(unix)]
fn slow_down_status(repo_path: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;

    let hook = repo_path.join(".git/slow-fsmonitor");
    fs::write(&hook, "#!/bin/sh\nsleep 1\nexit 1\n").unwrap();
    fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).unwrap();
    git(repo_path, &["config", "core.fsmonitor", &hook.to_string_lossy()]).unwrap();
    git(repo_path, &["config", "core.fsmonitorHookVersion", "2"]).unwrap();

    // The hook only runs once there is an index to refresh
    fs::write(repo_path.join("README.md"), "slow\n").unwrap();
    git(repo_path, &["add", "README.md"]).unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn test_cancellation_keeps_completed_results() -> Result<()> {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return Ok(());
    }

    let count = 12;
    let temp_dir = setup_many_repos(count);
    let result = scan(temp_dir.path())?;
    let paths = result.repository_paths();
    for path in &paths {
        slow_down_status(path);
    }
    let options = ExtractOptions {
        max_concurrency: 1,
        ..ExtractOptions::default()
    };

    // One repository at a time, each over a second: cancel after the first finishes
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(3000)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let statuses = extract_batch(&paths, &options, &cancel).await;

    // Returns promptly once cancelled instead of finishing the queue
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(!statuses.is_empty(), "statuses finished before cancel are kept");
    assert!(statuses.len() < count, "queued repositories are dropped");
    for (path, status) in &statuses {
        assert!(paths.contains(path));
        assert!(status.has_remote);
        assert_eq!(status.error, None);
    }

    Ok(())
}

#[tokio::test]
async fn test_stress_discovery_scaling_500() -> Result<()> {
    // Discovery alone needs no git; marker directories are enough
    let count = 500;
    let temp_dir = TempDir::new()?;
    for i in 0..count {
        fs::create_dir_all(temp_dir.path().join(format!("group-{}/repo-{i}/.git", i % 10)))?;
    }

    let start = std::time::Instant::now();
    let result = scan(temp_dir.path())?;
    let duration = start.elapsed();

    assert_eq!(result.total_repos, count);
    // root + 10 groups + 500 repositories
    assert_eq!(result.total_scanned, 1 + 10 + count);
    println!("Discovered {count} repos in {duration:?}");

    Ok(())
}
