//! Directory-structure documents.
//!
//! A document is a tree of named entries where every entry is either a
//! folder holding further entries or a file holding a short description.
//! Entries are addressed by [`TreePath`]s and edited through
//! [`DirectoryTree`], whose operations return edited copies instead of
//! mutating in place.

mod node;
mod path;
mod render;
mod tree;

pub use node::{Children, Node, TreeStats};
pub use path::{PathError, TreePath};
pub use render::TreeRenderer;
pub use tree::{DirectoryTree, TreeError};
