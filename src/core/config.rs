//! Configuration constants and settings

use std::time::Duration;

// Concurrency Configuration
//
// Status extraction spawns several short-lived git processes per repository. It is
// I/O-bound, so a little more parallelism than CPU cores pays off, but too many
// processes at once thrash the disk on large trees.

/// Upper bound for the smart concurrency default
pub const GIT_CONCURRENT_CAP: usize = 16;

/// Environment variable that overrides the concurrency default
pub const CONCURRENCY_ENV_VAR: &str = "GITREE_CONCURRENCY";

/// Determines the concurrency limit for status extraction
///
/// Priority order:
/// 1. --jobs N flag → N
/// 2. GITREE_CONCURRENCY env var → N
/// 3. Smart default → min(CPU_CORES + 2, 16)
pub fn get_concurrency(jobs: Option<usize>) -> usize {
    if let Some(n) = jobs {
        return n.max(1); // Ensure at least 1
    }

    if let Ok(env_concurrency) = std::env::var(CONCURRENCY_ENV_VAR) {
        match env_concurrency.parse::<usize>() {
            Ok(n) if n > 0 => return n,
            _ => log::warn!("ignoring invalid {CONCURRENCY_ENV_VAR}={env_concurrency:?}"),
        }
    }

    let cpu_count = num_cpus::get();
    (cpu_count + 2).min(GIT_CONCURRENT_CAP)
}

/// Concurrency used when no explicit limit is configured on `ExtractOptions`
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

// Timeouts
pub const DEFAULT_EXTRACT_TIMEOUT: Duration = Duration::from_secs(10);
pub const OVERALL_DEADLINE: Duration = Duration::from_secs(5 * 60);
pub const SLOW_EXTRACTION_THRESHOLD: Duration = Duration::from_millis(100);

// Status sentinels
pub const DETACHED_BRANCH: &str = "DETACHED";
pub const UNKNOWN_BRANCH: &str = "unknown";
pub const DEFAULT_REMOTE: &str = "origin";
pub const STASH_REF: &str = "refs/stash";
pub const LOCAL_BRANCH_PREFIX: &str = "refs/heads/";

// Diagnostic output limits
pub const MAX_FILES_PER_CATEGORY: usize = 20;

// Repository markers
pub const GIT_DIR_NAME: &str = ".git";
pub const BARE_HEAD_FILE: &str = "HEAD";
pub const BARE_REFS_DIR: &str = "refs";
pub const BARE_OBJECTS_DIR: &str = "objects";

// UI Constants
pub const NO_REPOS_MESSAGE: &str = "no repositories found";
pub const ROOT_LABEL: &str = ".";
pub const SCANNING_MESSAGE: &str = "Scanning repositories...";
pub const SPINNER_TEMPLATE: &str = "{spinner} {msg}";
pub const SPINNER_TICK: Duration = Duration::from_millis(100);
