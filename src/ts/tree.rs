use crate::edit::InputEdit;
use crate::range::SourceRange;
use crate::ts::cursor::report_missing_node;
use crate::ts::node::{Node, Symbol};
use std::convert::Infallible;
use std::fmt;
use std::mem::ManuallyDrop;
use std::ops::Range;
use std::ptr::NonNull;
use tree_sitter::ffi;

/// Sole owner of one native parse tree.
///
/// The handle is released exactly once, when the `SyntaxTree` is dropped.
/// [`Node`]s and [`Cursor`](crate::Cursor)s borrow the tree, so none of them
/// can be used after the drop or across an [`edit`](Self::edit).
pub struct SyntaxTree {
    raw: NonNull<ffi::TSTree>,
}

// SAFETY: the engine's trees are immutable except through `ts_tree_edit`,
// which is only reachable via `&mut self`, and `ts_tree_copy` is documented
// as safe to call concurrently on a shared tree.
unsafe impl Send for SyntaxTree {}
unsafe impl Sync for SyntaxTree {}

impl SyntaxTree {
    /// Take ownership of a tree produced by the engine.
    pub(crate) fn from_engine(tree: tree_sitter::Tree) -> Self {
        // SAFETY: a live `tree_sitter::Tree` never holds a null handle.
        let raw = unsafe { NonNull::new_unchecked(tree.into_raw()) };
        Self { raw }
    }

    /// Run `f` against a borrowed engine tree for `raw`.
    ///
    /// The view is wrapped in `ManuallyDrop`, so it never deletes the handle
    /// it borrows.
    pub(crate) fn with_engine_tree<R>(&self, f: impl FnOnce(&tree_sitter::Tree) -> R) -> R {
        // SAFETY: `raw` is live for as long as `self` is.
        let view = ManuallyDrop::new(unsafe { tree_sitter::Tree::from_raw(self.raw.as_ptr()) });
        f(&view)
    }

    fn with_engine_tree_mut<R>(&mut self, f: impl FnOnce(&mut tree_sitter::Tree) -> R) -> R {
        // SAFETY: as above; `&mut self` guarantees no other view exists.
        let mut view =
            ManuallyDrop::new(unsafe { tree_sitter::Tree::from_raw(self.raw.as_ptr()) });
        f(&mut view)
    }

    /// An independent duplicate of this tree.
    ///
    /// Returns `None` if the engine cannot produce one. Edits to the copy
    /// never show up in `self`.
    pub fn copy(&self) -> Option<SyntaxTree> {
        // SAFETY: `raw` is a live handle owned by `self`.
        let copied = unsafe { ffi::ts_tree_copy(self.raw.as_ptr()) };
        let Some(raw) = NonNull::new(copied) else {
            tracing::warn!("engine refused to copy syntax tree");
            return None;
        };

        Some(SyntaxTree { raw })
    }

    pub fn root_node(&self) -> Option<Node<'_>> {
        // SAFETY: `raw` is a live handle owned by `self`.
        let raw = unsafe { ffi::ts_tree_root_node(self.raw.as_ptr()) };
        Node::from_engine(raw)
    }

    /// Shift the tree's coordinates to account for `edit`.
    ///
    /// This does not re-parse: structure stays as it was, only positions
    /// move. Re-parse against the edited tree and call
    /// [`changed_ranges`](Self::changed_ranges) to learn what changed.
    pub fn edit(&mut self, edit: &InputEdit) {
        tracing::debug!(
            start_byte = edit.start_byte,
            old_end_byte = edit.old_end_byte,
            new_end_byte = edit.new_end_byte,
            "editing syntax tree"
        );
        let edit = tree_sitter::InputEdit::from(*edit);
        self.with_engine_tree_mut(|tree| tree.edit(&edit));
    }

    /// Ranges whose syntactic structure differs between `self` and `other`.
    ///
    /// `self` is the older revision, already [edited](Self::edit); `other`
    /// is the tree obtained by re-parsing against it. Every range comes
    /// through [`SourceRange::from_engine`], so its points may be flagged
    /// unreliable. An engine that reports nothing yields an empty vector.
    pub fn changed_ranges(&self, other: &SyntaxTree) -> Vec<SourceRange> {
        let ranges: Vec<SourceRange> = self.with_engine_tree(|old| {
            other.with_engine_tree(|new| {
                old.changed_ranges(new)
                    .map(SourceRange::from_engine)
                    .collect()
            })
        });

        tracing::debug!(count = ranges.len(), "computed changed ranges");
        ranges
    }

    /// Visit, in document order, the nodes overlapping `byte_range`.
    ///
    /// Enumeration starts at the root if the range covers it, otherwise at
    /// the smallest node spanning the whole range. It then walks that node's
    /// children from the first one extending past `byte_range.start`, each
    /// with its full subtree in pre-order. It stops at the first such child starting strictly after `byte_range.end`, so
    /// a child starting exactly at `end` is still visited.
    ///
    /// An `Err` from `visit` stops the enumeration and is returned as-is.
    pub fn enumerate_nodes<'t, E, F>(
        &'t self,
        byte_range: Range<usize>,
        mut visit: F,
    ) -> Result<(), E>
    where
        F: FnMut(Node<'t>) -> Result<(), E>,
    {
        if byte_range.start > byte_range.end {
            return Ok(());
        }
        let Some(root) = self.root_node() else {
            return Ok(());
        };

        // A root sharing its span with its only child would otherwise be
        // skipped in favour of the child.
        let covers_root =
            byte_range.start <= root.start_byte() && byte_range.end >= root.end_byte();
        let start = if covers_root {
            Some(root)
        } else {
            root.descendant_for_byte_range(byte_range.start, byte_range.end)
        };
        let Some(start) = start else {
            return Ok(());
        };

        visit(start)?;

        let mut cursor = start.walk();
        if !cursor.goto_first_child_for_byte(byte_range.start) {
            return Ok(());
        }

        cursor.enumerate_current_and_descendants(&mut visit)?;

        while cursor.goto_next_sibling() {
            let Some(node) = cursor.current_node() else {
                report_missing_node("sibling scan");
                break;
            };

            if node.start_byte() > byte_range.end {
                break;
            }

            cursor.enumerate_current_and_descendants(&mut visit)?;
        }

        Ok(())
    }

    /// [`enumerate_nodes`](Self::enumerate_nodes) collected into a vector.
    pub fn collect_nodes(&self, byte_range: Range<usize>) -> Vec<Node<'_>> {
        let mut nodes = Vec::new();
        infallible(self.enumerate_nodes(byte_range, |node| {
            nodes.push(node);
            Ok(())
        }));
        nodes
    }

    /// Resolve a node-type name to its symbol in this tree's grammar.
    ///
    /// `is_named` separates named rules from anonymous tokens that share the
    /// same text. Unknown names give `None`.
    pub fn symbol_for(&self, type_name: &str, is_named: bool) -> Option<Symbol> {
        let id =
            self.with_engine_tree(|tree| tree.language().id_for_node_kind(type_name, is_named));
        Symbol::new(id)
    }

    /// [`symbol_for`](Self::symbol_for) for a named node type.
    pub fn symbol_for_named(&self, type_name: &str) -> Option<Symbol> {
        self.symbol_for(type_name, true)
    }

    pub fn symbol_name(&self, symbol: Symbol) -> Option<&'static str> {
        self.with_engine_tree(|tree| tree.language().node_kind_for_id(symbol.id()))
    }

    /// Every node with `symbol`, parent before children, left to right.
    ///
    /// A match does not stop the descent: matching descendants of a
    /// matching node are collected as well.
    pub fn nodes_with_symbol(&self, symbol: Symbol) -> Vec<Node<'_>> {
        let mut nodes = Vec::new();
        let Some(root) = self.root_node() else {
            return nodes;
        };

        let mut cursor = root.walk();
        infallible(cursor.enumerate_current_and_descendants(|node| {
            if node.symbol() == Some(symbol) {
                nodes.push(node);
            }
            Ok(())
        }));
        nodes
    }

    pub fn has_errors(&self) -> bool {
        self.root_node().is_some_and(|root| root.has_error())
    }

    /// ERROR and MISSING nodes in pre-order.
    pub fn error_nodes(&self) -> Vec<ErrorNode> {
        let mut errors = Vec::new();
        let Some(root) = self.root_node() else {
            return errors;
        };

        let mut cursor = root.walk();
        infallible(cursor.enumerate_current_and_descendants(|node| {
            if node.is_error() || node.is_missing() {
                errors.push(ErrorNode {
                    kind: node.kind(),
                    missing: node.is_missing(),
                    range: node.range(),
                });
            }
            Ok(())
        }));
        errors
    }
}

impl Drop for SyntaxTree {
    fn drop(&mut self) {
        // SAFETY: `raw` is owned by `self` and no borrow outlives it.
        unsafe { ffi::ts_tree_delete(self.raw.as_ptr()) }
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("root", &self.root_node())
            .finish()
    }
}

/// Information about an ERROR or MISSING node in the parse tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNode {
    pub kind: &'static str,
    pub missing: bool,
    pub range: SourceRange,
}

fn infallible(result: Result<(), Infallible>) {
    match result {
        Ok(()) => {}
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::Point;
    use crate::ts::parser::SyntaxParser;
    use ast_grep_language::SupportLang;

    fn json(source: &str) -> SyntaxTree {
        SyntaxParser::for_lang(SupportLang::Json)
            .unwrap()
            .parse(source)
            .unwrap()
    }

    fn spans(nodes: &[Node<'_>]) -> Vec<(&'static str, Range<usize>)> {
        nodes.iter().map(|n| (n.kind(), n.byte_range())).collect()
    }

    #[test]
    fn copy_matches_original_root() {
        let tree = json("[1,2]");
        let copy = tree.copy().unwrap();

        let (a, b) = (tree.root_node().unwrap(), copy.root_node().unwrap());
        assert_eq!(a.symbol(), b.symbol());
        assert!(a.symbol().is_some());
        assert_eq!(a.byte_range(), b.byte_range());
    }

    #[test]
    fn editing_copy_leaves_original_alone() {
        let tree = json("[1,2]");
        let mut copy = tree.copy().unwrap();

        copy.edit(&InputEdit::insertion(0, Point::new(0, 0), 3));

        let number = tree.symbol_for_named("number").unwrap();
        assert_eq!(tree.nodes_with_symbol(number)[1].byte_range(), 3..4);
        assert_eq!(copy.nodes_with_symbol(number)[1].byte_range(), 6..7);
    }

    #[test]
    fn copy_outlives_dropped_original() {
        let tree = json("[1,2]");
        let copy = tree.copy().unwrap();
        drop(tree);

        assert_eq!(copy.root_node().unwrap().byte_range(), 0..5);
    }

    #[test]
    fn enumerate_single_leaf_range() {
        let tree = json("[1,2]");
        let nodes = tree.collect_nodes(3..4);
        assert_eq!(spans(&nodes), [("number", 3..4)]);
    }

    #[test]
    fn enumerate_includes_sibling_starting_at_upper_bound() {
        let tree = json("[1,2]");
        let nodes = tree.collect_nodes(1..4);
        assert_eq!(
            spans(&nodes),
            [
                ("array", 0..5),
                ("number", 1..2),
                (",", 2..3),
                ("number", 3..4),
                ("]", 4..5),
            ]
        );
    }

    #[test]
    fn enumerate_full_document_starts_at_root() {
        let source = "[1,2]";
        let tree = json(source);
        let root = tree.root_node().unwrap();
        assert_eq!(root.children()[0].byte_range(), root.byte_range());

        let nodes = tree.collect_nodes(0..source.len());

        assert_eq!(nodes[0], root);
        assert_eq!(nodes[0].kind(), "document");
        assert_eq!(
            spans(&nodes[1..]),
            [
                ("array", 0..5),
                ("[", 0..1),
                ("number", 1..2),
                (",", 2..3),
                ("number", 3..4),
                ("]", 4..5),
            ]
        );
    }

    #[test]
    fn enumerate_range_past_trailing_whitespace_starts_at_root() {
        let source = "[1,2]\n";
        let tree = json(source);
        let nodes = tree.collect_nodes(0..source.len());

        assert_eq!(nodes[0], tree.root_node().unwrap());
        assert_eq!(spans(&nodes[1..2]), [("array", 0..5)]);
    }

    #[test]
    fn enumerate_inverted_range_is_empty() {
        let tree = json("[1,2]");
        #[allow(clippy::reversed_empty_ranges)]
        let nodes = tree.collect_nodes(4..1);
        assert!(nodes.is_empty());
    }

    #[test]
    fn enumerate_stops_on_visitor_error() {
        let tree = json("[1,2,3]");
        let mut seen = Vec::new();

        let result = tree.enumerate_nodes(0..7, |node| {
            if node.kind() == "," {
                return Err(node.start_byte());
            }
            seen.push(node.kind());
            Ok(())
        });

        assert_eq!(result, Err(2));
        assert_eq!(seen, ["document", "array", "[", "number"]);
    }

    #[test]
    fn symbol_lookup_distinguishes_named() {
        let tree = json("[1,2]");
        let number = tree.symbol_for("number", true).unwrap();

        assert_eq!(tree.symbol_name(number), Some("number"));
        assert!(tree.symbol_for(",", false).is_some());
        assert_eq!(tree.symbol_for("no_such_rule", true), None);
    }

    #[test]
    fn nested_matches_are_not_pruned() {
        let tree = json("[[1],[]]");
        let array = tree.symbol_for_named("array").unwrap();
        let nodes = tree.nodes_with_symbol(array);

        assert_eq!(
            nodes.iter().map(Node::byte_range).collect::<Vec<_>>(),
            [0..8, 1..4, 5..7]
        );
    }

    #[test]
    fn absent_symbol_yields_nothing() {
        let tree = json("[1,2]");
        let object = tree.symbol_for_named("object").unwrap();
        assert!(tree.nodes_with_symbol(object).is_empty());
    }

    #[test]
    fn unedited_copy_has_no_changed_ranges() {
        let tree = json("[1,2]");
        let copy = tree.copy().unwrap();
        assert!(tree.changed_ranges(&copy).is_empty());
    }

    #[test]
    fn error_nodes_are_reported() {
        let clean = json("[1,2]");
        assert!(!clean.has_errors());
        assert!(clean.error_nodes().is_empty());

        let broken = json("[1,,2]");
        assert!(broken.has_errors());
        assert!(!broken.error_nodes().is_empty());
    }
}
