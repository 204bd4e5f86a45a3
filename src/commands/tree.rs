//! Tree command implementation
//!
//! Scans for repositories, reads their status concurrently and prints the
//! annotated tree (or the JSON scan result).

use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::core::{
    create_spinner, get_concurrency, scan_in_background, ScanOptions, ScanResult,
    OVERALL_DEADLINE,
};
use crate::git::{extract_batch, ExtractOptions};
use crate::tree::{self, RenderStyle};
use crate::utils::{resolve_root, ColorChoice};

/// Options of one tree invocation
#[derive(Debug, Clone, Default)]
pub struct TreeArgs {
    /// Directory to scan; the current directory when `None`
    pub path: Option<PathBuf>,
    /// Concurrency override for status extraction
    pub jobs: Option<usize>,
    /// Per-repository time budget; zero disables it
    pub timeout: Duration,
    pub color: ColorChoice,
    pub json: bool,
    pub debug: bool,
    pub no_progress: bool,
}

/// Fires `cancel` once the overall deadline passes or the user hits Ctrl-C
fn spawn_cancel_watcher(
    cancel: CancellationToken,
    deadline: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(deadline) => {
                log::warn!("overall deadline of {}s reached, stopping", deadline.as_secs());
                cancel.cancel();
            }
            Ok(()) = tokio::signal::ctrl_c() => {
                log::warn!("interrupted, stopping");
                cancel.cancel();
            }
        }
    })
}

/// Logs every non-fatal scan diagnostic as a warning; returns how many were logged
fn log_diagnostics(result: &ScanResult) -> usize {
    for diagnostic in &result.errors {
        log::warn!("{diagnostic}");
    }
    result.errors.len()
}

/// Runs discovery and status extraction under one cancellation token
pub async fn collect(args: &TreeArgs, cancel: &CancellationToken) -> Result<ScanResult> {
    let root = resolve_root(args.path.as_deref())?;
    let spinner = create_spinner(!args.no_progress)?;

    let scan_options = ScanOptions {
        cancel: Some(cancel.clone()),
    };
    let mut result = match scan_in_background(root, scan_options).await {
        Ok(result) => result,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };

    spinner.suspend(|| log_diagnostics(&result));

    if result.total_repos > 0 && !cancel.is_cancelled() {
        let repo_word = if result.total_repos == 1 {
            "repository"
        } else {
            "repositories"
        };
        spinner.set_message(format!(
            "Reading status of {} {repo_word}...",
            result.total_repos
        ));

        let options = ExtractOptions {
            timeout: args.timeout,
            max_concurrency: get_concurrency(args.jobs),
            debug: args.debug,
            excludes_file: None,
        };
        let statuses = extract_batch(&result.repository_paths(), &options, cancel).await;
        result.attach_statuses(statuses);
    }

    spinner.finish_and_clear();

    if let Err(e) = result.validate() {
        log::warn!("inconsistent scan result: {e}");
    }
    log::debug!(
        "scanned {} directories, {} repositories in {}ms ({:.0}% read cleanly)",
        result.total_scanned,
        result.total_repos,
        result.duration.as_millis(),
        result.success_rate() * 100.0
    );

    Ok(result)
}

/// Renders the collected result the way the user asked for it
pub fn render(result: &ScanResult, args: &TreeArgs) -> Result<String> {
    if args.json {
        let mut json = serde_json::to_string_pretty(result)?;
        json.push('\n');
        return Ok(json);
    }

    let style = RenderStyle::new(args.color.should_colorize());
    Ok(tree::format(&result.tree, &style))
}

/// Handles the tree command
pub async fn handle_tree_command(args: &TreeArgs) -> Result<()> {
    let cancel = CancellationToken::new();
    let watcher = spawn_cancel_watcher(cancel.clone(), OVERALL_DEADLINE);

    let collected = collect(args, &cancel).await;

    // Stop the watcher; its outcome no longer matters
    cancel.cancel();
    let _ = watcher.await;

    let result = collected?;
    print!("{}", render(&result, args)?);
    Ok(())
}
