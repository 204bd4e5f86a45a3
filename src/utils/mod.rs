pub(crate) mod fs;
pub(crate) mod terminal;

// Public API - utilities used by commands
pub use fs::resolve_root;
pub use terminal::ColorChoice;
