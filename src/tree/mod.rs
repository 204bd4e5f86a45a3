//! Tree building and rendering

mod builder;
mod node;
mod renderer;
mod style;

pub use builder::build;
pub use node::TreeNode;
pub use renderer::{annotate, format};
pub use style::{Category, Palette, RenderStyle};
