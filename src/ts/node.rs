use crate::range::{Point, SourceRange};
use crate::ts::cursor::Cursor;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::num::NonZeroU16;
use std::ops::Range;
use tree_sitter::ffi;

/// Numeric grammar symbol id, resolved from a node-type name.
///
/// The engine reserves id 0 for "no such symbol", so a `Symbol` is never 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(NonZeroU16);

impl Symbol {
    /// Wrap a raw id; `None` for the reserved id 0.
    pub fn new(id: u16) -> Option<Self> {
        NonZeroU16::new(id).map(Self)
    }

    pub fn id(self) -> u16 {
        self.0.get()
    }
}

/// A view of one node in a [`SyntaxTree`](crate::SyntaxTree) revision.
///
/// Nodes do not own anything. They borrow the tree they came from, so a
/// node cannot outlive the tree or survive an [`edit`](crate::SyntaxTree::edit);
/// re-derive nodes after editing to see the shifted coordinates.
#[derive(Clone, Copy)]
pub struct Node<'tree> {
    inner: tree_sitter::Node<'tree>,
}

impl<'tree> Node<'tree> {
    /// Wrap a raw engine node, mapping the null sentinel to `None`.
    ///
    /// The caller picks `'tree`; it must not exceed the borrow of the tree
    /// that produced `raw`.
    pub(crate) fn from_engine(raw: ffi::TSNode) -> Option<Self> {
        // SAFETY: `ts_node_is_null` only reads the node's fields.
        if unsafe { ffi::ts_node_is_null(raw) } {
            return None;
        }

        // SAFETY: `raw` is non-null and was produced by a live tree.
        let inner = unsafe { tree_sitter::Node::from_raw(raw) };
        Some(Self { inner })
    }

    pub(crate) fn from_inner(inner: tree_sitter::Node<'tree>) -> Self {
        Self { inner }
    }

    /// Grammar symbol of this node. Tree nodes never carry the reserved
    /// id 0, so this is `None` only for a malformed grammar.
    pub fn symbol(&self) -> Option<Symbol> {
        Symbol::new(self.inner.kind_id())
    }

    /// Node-type name, e.g. `"number"` or `","`.
    pub fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    pub fn is_named(&self) -> bool {
        self.inner.is_named()
    }

    pub fn is_error(&self) -> bool {
        self.inner.is_error()
    }

    pub fn is_missing(&self) -> bool {
        self.inner.is_missing()
    }

    /// Whether this node or any descendant is an error.
    pub fn has_error(&self) -> bool {
        self.inner.has_error()
    }

    pub fn start_byte(&self) -> usize {
        self.inner.start_byte()
    }

    pub fn end_byte(&self) -> usize {
        self.inner.end_byte()
    }

    pub fn byte_range(&self) -> Range<usize> {
        self.inner.byte_range()
    }

    pub fn start_point(&self) -> Point {
        self.inner.start_position().into()
    }

    pub fn end_point(&self) -> Point {
        self.inner.end_position().into()
    }

    /// Node positions are kept consistent by the engine, so this range is
    /// trusted as-is.
    pub fn range(&self) -> SourceRange {
        SourceRange::new(
            self.start_byte(),
            self.end_byte(),
            self.start_point(),
            self.end_point(),
        )
    }

    /// Smallest descendant (or `self`) spanning `[start, end]`.
    pub fn descendant_for_byte_range(&self, start: usize, end: usize) -> Option<Node<'tree>> {
        self.inner
            .descendant_for_byte_range(start, end)
            .map(Node::from_inner)
    }

    pub fn parent(&self) -> Option<Node<'tree>> {
        self.inner.parent().map(Node::from_inner)
    }

    pub fn child_count(&self) -> usize {
        self.inner.child_count()
    }

    /// Immediate children, named and anonymous, left to right.
    pub fn children(&self) -> Vec<Node<'tree>> {
        let mut cursor = self.inner.walk();
        self.inner
            .children(&mut cursor)
            .map(Node::from_inner)
            .collect()
    }

    /// Visit immediate children left to right, stopping at the first error.
    pub fn enumerate_children<E, F>(&self, mut visit: F) -> Result<(), E>
    where
        F: FnMut(Node<'tree>) -> Result<(), E>,
    {
        let mut cursor = self.inner.walk();
        if !cursor.goto_first_child() {
            return Ok(());
        }

        loop {
            visit(Node::from_inner(cursor.node()))?;
            if !cursor.goto_next_sibling() {
                return Ok(());
            }
        }
    }

    /// A cursor starting at this node.
    pub fn walk(&self) -> Cursor<'tree> {
        Cursor::new(self.inner)
    }

    /// The slice of `source` this node spans, if it lies within `source`.
    pub fn utf8_text<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.byte_range())
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id() == other.inner.id() && self.byte_range() == other.byte_range()
    }
}

impl Eq for Node<'_> {}

impl Hash for Node<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id().hash(state);
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind())
            .field("symbol", &self.inner.kind_id())
            .field("bytes", &self.byte_range())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ts::parser::SyntaxParser;
    use ast_grep_language::SupportLang;

    #[test]
    fn symbol_zero_is_not_a_symbol() {
        assert_eq!(Symbol::new(0), None);
        assert_eq!(Symbol::new(7).map(Symbol::id), Some(7));
        assert_eq!(
            std::mem::size_of::<Option<Symbol>>(),
            std::mem::size_of::<u16>()
        );
    }

    #[test]
    fn children_include_punctuation() {
        let mut parser = SyntaxParser::for_lang(SupportLang::Json).unwrap();
        let tree = parser.parse("[1,2]").unwrap();
        let array = tree.root_node().unwrap().children()[0];

        let kinds: Vec<_> = array.children().iter().map(Node::kind).collect();
        assert_eq!(kinds, ["[", "number", ",", "number", "]"]);
        assert_eq!(array.child_count(), 5);
    }

    #[test]
    fn enumerate_children_stops_on_error() {
        let mut parser = SyntaxParser::for_lang(SupportLang::Json).unwrap();
        let tree = parser.parse("[1,2]").unwrap();
        let array = tree.root_node().unwrap().children()[0];

        let mut seen = Vec::new();
        let result = array.enumerate_children(|child| {
            seen.push(child.kind());
            if child.kind() == "," {
                Err("stop")
            } else {
                Ok(())
            }
        });

        assert_eq!(result, Err("stop"));
        assert_eq!(seen, ["[", "number", ","]);
    }

    #[test]
    fn node_text_and_points() {
        let source = "[1,\n 22]";
        let mut parser = SyntaxParser::for_lang(SupportLang::Json).unwrap();
        let tree = parser.parse(source).unwrap();
        let second = tree
            .root_node()
            .unwrap()
            .descendant_for_byte_range(5, 7)
            .unwrap();

        assert_eq!(second.kind(), "number");
        assert_eq!(second.utf8_text(source), Some("22"));
        assert_eq!(second.start_point(), Point::new(1, 1));
        assert_eq!(second.end_point(), Point::new(1, 3));
        assert!(second.range().has_reliable_points());
        assert_eq!(second.parent().map(|p| p.kind()), Some("array"));
    }
}
