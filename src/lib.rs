//! An ordered set of unique values backed by an AVL tree.
//!
//! Besides insertion, lookup and removal the tree offers a level-order
//! [`snapshot`](AvlTree::snapshot) of its shape, which the [`Pretty`] renderer
//! turns into ASCII art.

mod error;
mod queue;
mod render;
mod tree;

pub use error::{Error, Result};
pub use queue::Queue;
pub use render::{Pretty, RenderOptions, DEFAULT_WIDTH};
pub use tree::{AvlTree, LevelEntry};
