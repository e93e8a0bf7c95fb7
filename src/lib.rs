//! sitter-walk: safe tree lifecycle and traversal over tree-sitter
//!
//! Wraps the tree-sitter engine's native parse trees in an owning type with
//! exactly-once release, and builds cursor traversal, range-bounded node
//! enumeration, incremental edit/diff and symbol lookup on top of it.
//!
//! # Architecture
//!
//! [`SyntaxTree`] owns the native handle. [`Node`] and [`Cursor`] are
//! borrowed views, so a view can never outlive its tree or be used across
//! [`SyntaxTree::edit`]. Ranges reported by the engine enter the crate
//! through [`SourceRange::from_engine`], the one place where their points
//! are checked against their bytes.
//!
//! # Example
//!
//! ```no_run
//! use sitter_walk::{SupportLang, SyntaxParser, TextChange};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut parser = SyntaxParser::for_lang(SupportLang::Json)?;
//! let source = "[1,2]";
//! let mut tree = parser.parse(source)?;
//!
//! let number = tree.symbol_for_named("number").expect("json has numbers");
//! assert_eq!(tree.nodes_with_symbol(number).len(), 2);
//!
//! let (new_source, edit) = TextChange::insert(4, ",3").apply(source)?;
//! tree.edit(&edit);
//! let reparsed = parser.reparse(&new_source, &tree)?;
//! for range in tree.changed_ranges(&reparsed) {
//!     println!("changed: {:?}", range.reconcile(&new_source));
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod document;
pub mod edit;
pub mod range;
pub mod ts;

// Re-exports
pub use ast_grep_language::SupportLang;
pub use config::{load_from_path, load_from_str, parser_from_path, ConfigError, SitterConfig};
pub use document::{Document, DocumentError};
pub use edit::{EditError, InputEdit, TextChange};
pub use range::{point_at, Point, SourceRange};
pub use ts::{Cursor, ErrorNode, Node, Symbol, SyntaxParser, SyntaxTree, TreeSitterError};
