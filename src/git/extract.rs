//! Status extraction for single repositories and concurrent batches

use dashmap::DashMap;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use super::changes::ChangeSet;
use super::divergence::ahead_behind;
use super::excludes::load_global_excludes;
use super::operations::{
    list_remotes, open_repository, porcelain_status, read_head, ref_exists, Head,
};
use super::status::{ExtractError, Status};
use crate::core::config::{
    DEFAULT_EXTRACT_TIMEOUT, DEFAULT_MAX_CONCURRENCY, DETACHED_BRANCH, MAX_FILES_PER_CATEGORY,
    SLOW_EXTRACTION_THRESHOLD, STASH_REF, UNKNOWN_BRANCH,
};

/// Settings for status extraction
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Time budget for one repository; zero disables the limit
    pub timeout: Duration,
    /// Maximum number of repositories processed at once by `extract_batch`
    pub max_concurrency: usize,
    /// Log timing, status summaries and changed files per repository
    pub debug: bool,
    /// Global excludes file applied to working-tree status
    pub excludes_file: Option<PathBuf>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_EXTRACT_TIMEOUT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            debug: false,
            excludes_file: None,
        }
    }
}

impl ExtractOptions {
    /// Fills `excludes_file` from the user's git configuration if it is not set yet
    pub fn with_global_excludes(mut self) -> Self {
        if self.excludes_file.is_none() {
            self.excludes_file = load_global_excludes().map(|excludes| excludes.path);
        }
        self
    }
}

/// Extracts the status of one repository
///
/// Never fails: every problem is folded into the returned status. Running past
/// `options.timeout` abandons the work, kills its git processes and yields a timeout
/// placeholder.
pub async fn extract(path: &Path, options: &ExtractOptions) -> Status {
    let started = Instant::now();
    if options.debug {
        log::debug!("starting status extraction for {}", path.display());
    }

    let status = if options.timeout.is_zero() {
        read_status(path, options).await
    } else {
        match tokio::time::timeout(options.timeout, read_status(path, options)).await {
            Ok(status) => status,
            Err(_) => {
                log::warn!(
                    "{}: status extraction timed out after {:?}",
                    path.display(),
                    options.timeout
                );
                Status::degraded(ExtractError::Timeout(options.timeout))
            }
        }
    };

    if options.debug {
        let elapsed = started.elapsed();
        if elapsed > SLOW_EXTRACTION_THRESHOLD {
            log::debug!(
                "{}: status extraction took {}ms",
                path.display(),
                elapsed.as_millis()
            );
        }
        log::debug!("{}: {}", path.display(), status.summary());
    }

    status
}

/// Runs every extraction step, each one allowed to fail without stopping the rest
async fn read_status(path: &Path, options: &ExtractOptions) -> Status {
    let is_bare = match open_repository(path).await {
        Ok(is_bare) => is_bare,
        Err(e) => {
            return Status::degraded(ExtractError::Open(format!(
                "failed to open repository: {e}"
            )))
        }
    };

    let mut status = Status {
        branch: UNKNOWN_BRANCH.to_string(),
        ..Status::default()
    };

    match read_head(path).await {
        Ok(Head::Branch(name)) => status.branch = name,
        Ok(Head::Detached) => {
            status.is_detached = true;
            status.branch = DETACHED_BRANCH.to_string();
        }
        Err(e) => status.note_error(ExtractError::Branch(e.to_string())),
    }

    match list_remotes(path).await {
        Ok(remotes) => status.has_remote = !remotes.is_empty(),
        Err(e) => status.note_error(ExtractError::Remotes(e.to_string())),
    }

    let on_branch = !status.is_detached && status.branch != UNKNOWN_BRANCH;
    if status.has_remote && on_branch {
        match ahead_behind(path, &status.branch).await {
            Ok(Some((ahead, behind))) => {
                status.ahead = ahead;
                status.behind = behind;
            }
            Ok(None) => {}
            Err(e) => status.note_error(ExtractError::Divergence(e.to_string())),
        }
    }

    status.has_stashes = ref_exists(path, STASH_REF).await.unwrap_or(false);

    // Bare repositories have no working tree to compare
    if !is_bare {
        match porcelain_status(path, options.excludes_file.as_deref()).await {
            Ok(raw) => {
                let changes = ChangeSet::from_porcelain(&raw);
                status.has_changes = !changes.is_clean();
                if options.debug && status.has_changes {
                    for line in changes.report_lines(MAX_FILES_PER_CATEGORY) {
                        log::debug!("{}: {line}", path.display());
                    }
                }
            }
            Err(e) => status.note_error(ExtractError::Worktree(e.to_string())),
        }
    }

    status
}

/// Runs `work` for every key with at most `limit` units in flight
///
/// Units still queued or running when `cancel` fires are dropped, so the returned map
/// holds only the units that finished.
async fn run_bounded<'a, K, V, F, Fut>(
    keys: &'a [K],
    limit: usize,
    cancel: &CancellationToken,
    work: F,
) -> DashMap<K, V>
where
    K: Clone + Eq + Hash + fmt::Debug,
    F: Fn(&'a K) -> Fut,
    Fut: Future<Output = V>,
{
    let semaphore = Semaphore::new(limit.max(1));
    let results: DashMap<K, V> = DashMap::with_capacity(keys.len());

    let mut units: FuturesUnordered<_> = keys
        .iter()
        .map(|key| {
            let (semaphore, results, work) = (&semaphore, &results, &work);
            async move {
                if cancel.is_cancelled() {
                    return;
                }

                let _permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return,
                    permit = semaphore.acquire() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return,
                    },
                };

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        log::debug!("{key:?}: cancelled");
                    }
                    value = work(key) => {
                        results.insert(key.clone(), value);
                    }
                }
            }
        })
        .collect();

    while units.next().await.is_some() {}
    drop(units);

    results
}

/// Extracts statuses for many repositories with bounded concurrency
///
/// At most `options.max_concurrency` extractions run at once. When `cancel` fires,
/// queued and in-flight extractions are dropped and only the statuses finished so far
/// are returned. Every path that was not cancelled gets an entry, degraded or not.
pub async fn extract_batch(
    paths: &[PathBuf],
    options: &ExtractOptions,
    cancel: &CancellationToken,
) -> HashMap<PathBuf, Status> {
    if paths.is_empty() {
        return HashMap::new();
    }

    // Resolve the global excludes once for the whole batch
    let options = options.clone().with_global_excludes();
    let options = &options;
    let results = run_bounded(paths, options.max_concurrency, cancel, move |path| {
        extract(path, options)
    })
    .await;

    if cancel.is_cancelled() {
        log::warn!(
            "status extraction cancelled: {} of {} repositories completed",
            results.len(),
            paths.len()
        );
    }

    results.into_iter().collect()
}
