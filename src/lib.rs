//! # gitree
//!
//! `gitree` finds every git repository below a directory and draws them as a tree,
//! each annotated with its branch and sync state. It powers the `gitree` CLI tool.
//!
//! ## Core Features
//!
//! - **Safe Discovery**: Depth-first walk that stops at repository roots, follows
//!   symlinks once and survives unreadable directories.
//! - **Concurrent Status**: Branch, ahead/behind, stash and working-tree state read for
//!   many repositories at once with per-repository timeouts.
//! - **Tree Output**: Line-drawing rendering with optional color.
//!
//! ## Example
//!
//! ```rust,no_run
//! use gitree::core::scan;
//! use gitree::git::{extract_batch, ExtractOptions};
//! use gitree::tree::{format, RenderStyle};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut result = scan(&std::env::current_dir()?)?;
//!     let statuses = extract_batch(
//!         &result.repository_paths(),
//!         &ExtractOptions::default(),
//!         &CancellationToken::new(),
//!     )
//!     .await;
//!     result.attach_statuses(statuses);
//!     print!("{}", format(&result.tree, &RenderStyle::plain()));
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod core;
pub mod git;
pub mod tree;
pub mod utils;
