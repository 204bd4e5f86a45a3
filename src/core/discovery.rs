//! Repository discovery
//!
//! The walk runs on `ignore::WalkBuilder` with every ignore filter turned off. It is
//! sequential and depth-first with entries visited in file-name order, so two scans
//! of the same tree report repositories and diagnostics in the same order. Descent
//! stops at every repository root and at directories already seen through another path.

use ignore::{DirEntry, WalkBuilder};
use std::collections::HashSet;
use std::fs::{self, Metadata};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use super::config::{BARE_HEAD_FILE, BARE_OBJECTS_DIR, BARE_REFS_DIR, GIT_DIR_NAME};
use super::model::{Repository, ScanDiagnostic, ScanResult};

/// Fatal scan failure; no result is produced
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("root path must be absolute: {}", .0.display())]
    NotAbsolute(PathBuf),
    #[error("cannot access root path {}: {source}", .path.display())]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("root path {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("repository discovery task failed: {0}")]
    TaskFailed(String),
}

/// Optional knobs for a scan
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Stops the walk early; the partial result is returned with a `Cancelled` diagnostic
    pub cancel: Option<CancellationToken>,
}

/// Key identifying the same underlying directory across different paths
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DirIdentity {
    /// Device and inode pair
    Inode { dev: u64, ino: u64 },
    /// Fully resolved path, used where no inode identity is available
    Path(PathBuf),
}

impl DirIdentity {
    /// Identity of the directory at `path` whose (followed) metadata is `metadata`
    #[cfg(unix)]
    pub fn of(_path: &Path, metadata: &Metadata) -> io::Result<Self> {
        use std::os::unix::fs::MetadataExt;

        Ok(DirIdentity::Inode {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    /// Identity of the directory at `path` whose (followed) metadata is `metadata`
    #[cfg(not(unix))]
    pub fn of(path: &Path, _metadata: &Metadata) -> io::Result<Self> {
        Self::from_path(path)
    }

    /// Path-based identity: the canonical form of `path`
    pub fn from_path(path: &Path) -> io::Result<Self> {
        Ok(DirIdentity::Path(fs::canonicalize(path)?))
    }
}

/// Kind of repository found at a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoMarker {
    /// `.git` directory, or a `.git` file pointing elsewhere (linked worktrees)
    WorkTree,
    /// `HEAD`, `refs/` and `objects/` directly in the directory
    Bare,
}

/// Check if a .git file (for submodules/worktrees) contains gitdir reference
/// Only reads the first 5 lines for efficiency
fn is_git_file(path: &Path) -> bool {
    match fs::File::open(path) {
        Ok(file) => BufReader::new(file)
            .lines()
            .take(5)
            .map_while(Result::ok)
            .any(|line| line.trim_start().starts_with("gitdir:")),
        Err(_) => false,
    }
}

fn is_dir(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| m.is_dir())
}

/// Checks whether `path` is a repository root
pub fn repository_marker(path: &Path) -> Option<RepoMarker> {
    let git_dir = path.join(GIT_DIR_NAME);
    match fs::metadata(&git_dir) {
        Ok(meta) if meta.is_dir() => return Some(RepoMarker::WorkTree),
        Ok(meta) if meta.is_file() && is_git_file(&git_dir) => return Some(RepoMarker::WorkTree),
        _ => {}
    }

    // All three must exist for a bare repository
    let has_head = path.join(BARE_HEAD_FILE).exists();
    if has_head && is_dir(&path.join(BARE_REFS_DIR)) && is_dir(&path.join(BARE_OBJECTS_DIR)) {
        return Some(RepoMarker::Bare);
    }

    None
}

/// State accumulated during one walk, shared with the entry filter
#[derive(Default)]
struct Walker {
    repositories: Vec<Repository>,
    diagnostics: Vec<ScanDiagnostic>,
    visited: HashSet<DirIdentity>,
    dir_count: usize,
    /// Symlinked directories accepted so far; everything below them is flagged
    symlinked: Vec<PathBuf>,
}

impl Walker {
    /// Decides whether the walk descends into the directory at `path`
    fn visit_dir(&mut self, path: &Path, is_symlink: bool) -> bool {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                self.record_io_error(path, &e);
                return false;
            }
        };
        let identity = match DirIdentity::of(path, &metadata) {
            Ok(identity) => identity,
            Err(e) => {
                self.record_io_error(path, &e);
                return false;
            }
        };
        if !self.visited.insert(identity) {
            log::debug!("skipping already visited directory {}", path.display());
            return false;
        }
        self.dir_count += 1;

        if is_symlink {
            self.symlinked.push(path.to_path_buf());
        }
        let via_symlink = self.symlinked.iter().any(|link| path.starts_with(link));

        if let Some(marker) = repository_marker(path) {
            log::debug!("found repository {} ({marker:?})", path.display());
            self.repositories.push(Repository::new(
                path,
                marker == RepoMarker::Bare,
                via_symlink,
            ));
            // Never look inside a repository
            return false;
        }
        true
    }

    /// Entry filter of the walk; `false` prunes the entry
    fn accept(&mut self, entry: &DirEntry) -> bool {
        let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
        if is_dir {
            return self.visit_dir(entry.path(), entry.path_is_symlink());
        }
        if entry.path_is_symlink() {
            self.diagnostics
                .push(ScanDiagnostic::SymlinkNotDirectory(entry.path().to_path_buf()));
        }
        false
    }

    fn record_walk_error(&mut self, error: &ignore::Error) {
        if is_loop(error) {
            log::debug!("skipping symlink cycle: {error}");
            return;
        }

        let Some(path) = error_path(error) else {
            log::debug!("walk error without a path: {error}");
            return;
        };
        let path = path.to_path_buf();
        let message = error
            .io_error()
            .map_or_else(|| error.to_string(), io::Error::to_string);

        let is_link = fs::symlink_metadata(&path).is_ok_and(|m| m.file_type().is_symlink());
        if is_link && fs::metadata(&path).is_err() {
            self.diagnostics
                .push(ScanDiagnostic::BrokenSymlink { path, message });
            return;
        }

        match error.io_error() {
            Some(e) => self.record_io_error(&path, e),
            None => self
                .diagnostics
                .push(ScanDiagnostic::Unreadable { path, message }),
        }
    }

    fn record_io_error(&mut self, path: &Path, error: &io::Error) {
        let diagnostic = if error.kind() == io::ErrorKind::PermissionDenied {
            ScanDiagnostic::PermissionDenied(path.to_path_buf())
        } else {
            ScanDiagnostic::Unreadable {
                path: path.to_path_buf(),
                message: error.to_string(),
            }
        };
        log::debug!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

fn is_loop(error: &ignore::Error) -> bool {
    match error {
        ignore::Error::Loop { .. } => true,
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithPath { err, .. } => is_loop(err),
        _ => false,
    }
}

fn error_path(error: &ignore::Error) -> Option<&Path> {
    match error {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        _ => None,
    }
}

fn lock(state: &Mutex<Walker>) -> MutexGuard<'_, Walker> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Walks below `root`, which the caller has already visited and not pruned
fn walk(root: &Path, state: &Arc<Mutex<Walker>>, cancel: Option<&CancellationToken>) {
    let filter_state = Arc::clone(state);
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| lock(&filter_state).accept(entry))
        .build();

    for result in walker {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            let path = match &result {
                Ok(entry) => entry.path().to_path_buf(),
                Err(e) => error_path(e).map_or_else(|| root.to_path_buf(), Path::to_path_buf),
            };
            lock(state).diagnostics.push(ScanDiagnostic::Cancelled(path));
            break;
        }
        if let Err(e) = result {
            lock(state).record_walk_error(&e);
        }
    }
}

/// Recursively scans `root` for git repositories
///
/// `root` must be an existing absolute directory. Unreadable directories, broken
/// symlinks and symlink cycles are pruned and reported in `ScanResult::errors`.
pub fn scan(root: &Path) -> Result<ScanResult, ScanError> {
    scan_with(root, &ScanOptions::default())
}

/// Scans `root` like [`scan`], honoring `options`
pub fn scan_with(root: &Path, options: &ScanOptions) -> Result<ScanResult, ScanError> {
    let start_time = Instant::now();

    if !root.is_absolute() {
        return Err(ScanError::NotAbsolute(root.to_path_buf()));
    }
    let metadata = fs::metadata(root).map_err(|source| ScanError::Inaccessible {
        path: root.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut walker = Walker::default();
    if options.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
        walker
            .diagnostics
            .push(ScanDiagnostic::Cancelled(root.to_path_buf()));
    } else if walker.visit_dir(root, false) {
        let state = Arc::new(Mutex::new(walker));
        walk(root, &state, options.cancel.as_ref());
        walker = std::mem::take(&mut *lock(&state));
    }

    log::debug!(
        "scanned {} directories under {}: {} repositories, {} diagnostics",
        walker.dir_count,
        root.display(),
        walker.repositories.len(),
        walker.diagnostics.len()
    );

    Ok(ScanResult::new(
        root.to_path_buf(),
        walker.repositories,
        walker.dir_count,
        walker.diagnostics,
        start_time.elapsed(),
    ))
}

/// Runs [`scan_with`] on the blocking thread pool so async callers stay responsive
pub async fn scan_in_background(
    root: PathBuf,
    options: ScanOptions,
) -> Result<ScanResult, ScanError> {
    tokio::task::spawn_blocking(move || scan_with(&root, &options))
        .await
        .unwrap_or_else(|e| Err(ScanError::TaskFailed(e.to_string())))
}
