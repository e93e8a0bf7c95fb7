//! Owned trees, node views and cursors over the tree-sitter engine.
//!
//! [`SyntaxTree`] is the only type that touches the native tree handle.
//! [`Node`] and [`Cursor`] borrow from it, so the borrow checker enforces
//! that no view outlives its tree or survives an edit.

pub mod cursor;
pub mod errors;
pub mod node;
pub mod parser;
pub mod tree;

pub use cursor::Cursor;
pub use errors::TreeSitterError;
pub use node::{Node, Symbol};
pub use parser::SyntaxParser;
pub use tree::{ErrorNode, SyntaxTree};
