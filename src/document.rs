//! Source text kept in sync with its syntax tree.
//!
//! A [`Document`] runs the full incremental cycle for each text change:
//! splice the text, edit the old tree, re-parse against it, and diff the two
//! revisions. Changed ranges come back with points re-derived from the new
//! text.

use crate::edit::{EditError, TextChange};
use crate::range::SourceRange;
use crate::ts::{SyntaxParser, SyntaxTree, TreeSitterError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("edit error: {0}")]
    Edit(#[from] EditError),

    #[error("parse error: {0}")]
    Parse(#[from] TreeSitterError),
}

pub struct Document {
    parser: SyntaxParser,
    text: String,
    tree: SyntaxTree,
    revision: u64,
}

impl Document {
    pub fn new(mut parser: SyntaxParser, text: impl Into<String>) -> Result<Self, DocumentError> {
        let text = text.into();
        let tree = parser.parse(&text)?;

        Ok(Self {
            parser,
            text,
            tree,
            revision: 0,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// Number of changes applied since the document was created.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply `change` and return the ranges whose structure changed.
    ///
    /// An invalid change leaves the document untouched. If re-parsing fails,
    /// the text is updated and the previous tree stays in place, edited to
    /// the new coordinates, so a later change can still reuse it.
    pub fn apply(&mut self, change: &TextChange) -> Result<Vec<SourceRange>, DocumentError> {
        let (text, edit) = change.apply(&self.text)?;

        self.tree.edit(&edit);
        self.text = text;
        self.revision += 1;

        let tree = self.parser.reparse(&self.text, &self.tree)?;
        let changed = self
            .tree
            .changed_ranges(&tree)
            .into_iter()
            .map(|range| range.reconcile(&self.text))
            .collect();
        self.tree = tree;

        tracing::debug!(revision = self.revision, "applied text change");
        Ok(changed)
    }
}
