//! Public API for the core module.
//!
//! This module provides the stable public API for core functionality including:
//! - Repository discovery
//! - The scan data model and its validation
//! - Configuration utilities
//!
//! Internal implementation details are not exposed through this API.

// Data model
pub use super::model::{Repository, ScanDiagnostic, ScanResult, ValidationError};

// Discovery
pub use super::discovery::{
    repository_marker, scan, scan_in_background, scan_with, DirIdentity, RepoMarker, ScanError,
    ScanOptions,
};

// Configuration
pub use super::config::{get_concurrency, CONCURRENCY_ENV_VAR, GIT_CONCURRENT_CAP};
pub use super::config::{
    DEFAULT_EXTRACT_TIMEOUT, DEFAULT_MAX_CONCURRENCY, MAX_FILES_PER_CATEGORY, OVERALL_DEADLINE,
};

// Status sentinels
pub use super::config::{DETACHED_BRANCH, UNKNOWN_BRANCH};

// User-facing messages
pub use super::config::{NO_REPOS_MESSAGE, ROOT_LABEL};

// Progress reporting
pub use super::progress::create_spinner;
