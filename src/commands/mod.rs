//! Command implementations for the gitree binary

pub mod tree;

pub use tree::{handle_tree_command, TreeArgs};
