use crate::ts::node::Node;

/// Stateful depth-first traversal handle over one tree revision.
///
/// A cursor is created from a node and never moves above it: `goto_parent`
/// fails once the cursor is back on its starting node.
pub struct Cursor<'tree> {
    inner: tree_sitter::TreeCursor<'tree>,
}

impl<'tree> Cursor<'tree> {
    pub(crate) fn new(node: tree_sitter::Node<'tree>) -> Self {
        Self { inner: node.walk() }
    }

    /// The node the cursor is on.
    ///
    /// `None` only if the engine hands back its null node, which a
    /// successfully moved cursor should never do.
    pub fn current_node(&self) -> Option<Node<'tree>> {
        Node::from_engine(self.inner.node().into_raw())
    }

    /// Depth relative to the node the cursor started on.
    pub fn depth(&self) -> u32 {
        self.inner.depth()
    }

    pub fn goto_first_child(&mut self) -> bool {
        self.inner.goto_first_child()
    }

    /// Move to the first child that extends beyond `byte`.
    pub fn goto_first_child_for_byte(&mut self, byte: usize) -> bool {
        self.inner.goto_first_child_for_byte(byte).is_some()
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        self.inner.goto_next_sibling()
    }

    pub fn goto_parent(&mut self) -> bool {
        self.inner.goto_parent()
    }

    /// Restart the cursor at `node`, which becomes its new top.
    pub fn reset(&mut self, node: Node<'tree>) {
        *self = node.walk();
    }

    /// Visit the current node and all of its descendants in pre-order.
    ///
    /// The cursor ends up back on the node it started on, whether the walk
    /// finishes or `visit` returns an error.
    pub fn enumerate_current_and_descendants<E, F>(&mut self, mut visit: F) -> Result<(), E>
    where
        F: FnMut(Node<'tree>) -> Result<(), E>,
    {
        let start_depth = self.inner.depth();
        let result = self.walk_subtree(start_depth, &mut visit);

        while self.inner.depth() > start_depth {
            if !self.inner.goto_parent() {
                break;
            }
        }

        result
    }

    fn walk_subtree<E, F>(&mut self, start_depth: u32, visit: &mut F) -> Result<(), E>
    where
        F: FnMut(Node<'tree>) -> Result<(), E>,
    {
        loop {
            let Some(node) = self.current_node() else {
                report_missing_node("pre-order walk");
                return Ok(());
            };
            visit(node)?;

            if self.inner.goto_first_child() {
                continue;
            }

            loop {
                if self.inner.depth() <= start_depth {
                    return Ok(());
                }
                if self.inner.goto_next_sibling() {
                    break;
                }
                if !self.inner.goto_parent() {
                    return Ok(());
                }
            }
        }
    }
}

/// A move reported success but left the cursor without a node. That is an
/// engine bug; traversal stops instead of crashing in release builds.
pub(crate) fn report_missing_node(during: &'static str) {
    tracing::error!(during, "cursor moved but has no current node");
    debug_assert!(false, "cursor moved but has no current node ({during})");
}
