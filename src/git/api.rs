//! Public API for git status extraction.
//!
//! This module provides the stable public API for reading repository state:
//! - Single-repository extraction with a per-repository timeout
//! - Concurrent batch extraction with cancellation
//! - The status record, its degraded forms and helpers
//!
//! ## Example: Reading one repository
//!
//! ```rust,no_run
//! use gitree::git::{extract, ExtractOptions};
//! use std::path::Path;
//!
//! async fn check(path: &Path) {
//!     let status = extract(path, &ExtractOptions::default()).await;
//!     if status.has_changes {
//!         println!("{} has uncommitted changes", status.branch);
//!     }
//! }
//! ```

// Extraction
pub use super::extract::{extract, extract_batch, ExtractOptions};

// Status
pub use super::status::{ExtractError, Status};

// Building blocks used by extraction, exported for integration tests and benches
pub use super::changes::{ChangeKind, ChangeSet};
pub use super::divergence::{ahead_behind, count_divergence, tracking_ref};
pub use super::excludes::{load_excludes_file, load_global_excludes, GlobalExcludes};
pub use super::operations::{read_head, reachable_commits, run_git, Head};
