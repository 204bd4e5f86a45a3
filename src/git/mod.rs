pub(crate) mod changes;
pub(crate) mod divergence;
pub(crate) mod excludes;
pub(crate) mod extract;
pub(crate) mod operations;
pub(crate) mod status;

// Public API - curated exports only
pub mod api;

// Re-export key items at module level for convenience
pub use api::*;
