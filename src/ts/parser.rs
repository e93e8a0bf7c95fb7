use crate::config::SitterConfig;
use crate::ts::errors::TreeSitterError;
use crate::ts::tree::SyntaxTree;
use ast_grep_language::{LanguageExt, SupportLang};
use tree_sitter::{Language, Parser};

/// Tree-sitter parser wrapper bound to one grammar.
pub struct SyntaxParser {
    parser: Parser,
}

impl std::fmt::Debug for SyntaxParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxParser").finish_non_exhaustive()
    }
}

impl SyntaxParser {
    /// Create a parser for an arbitrary tree-sitter grammar.
    pub fn new(language: &Language) -> Result<Self, TreeSitterError> {
        let mut parser = Parser::new();
        parser
            .set_language(language)
            .map_err(|e| TreeSitterError::LanguageSet {
                message: e.to_string(),
            })?;

        Ok(Self { parser })
    }

    /// Create a parser for one of the bundled grammars.
    pub fn for_lang(lang: SupportLang) -> Result<Self, TreeSitterError> {
        Self::new(&lang.get_ts_language())
    }

    /// Create a parser for the grammar named in `config`.
    pub fn from_config(config: &SitterConfig) -> Result<Self, TreeSitterError> {
        Self::for_lang(config.support_lang()?)
    }

    /// Parse source code into a fresh tree.
    pub fn parse(&mut self, source: &str) -> Result<SyntaxTree, TreeSitterError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or(TreeSitterError::ParseFailed)?;

        tracing::debug!(bytes = source.len(), "parsed source");
        Ok(SyntaxTree::from_engine(tree))
    }

    /// Re-parse `source`, reusing the unchanged parts of `previous`.
    ///
    /// `previous` must already have been [edited](SyntaxTree::edit) to match
    /// `source`; otherwise the result is a valid tree built from stale reuse.
    pub fn reparse(
        &mut self,
        source: &str,
        previous: &SyntaxTree,
    ) -> Result<SyntaxTree, TreeSitterError> {
        let parser = &mut self.parser;
        let tree = previous
            .with_engine_tree(|old| parser.parse(source, Some(old)))
            .ok_or(TreeSitterError::ParseFailed)?;

        tracing::debug!(bytes = source.len(), "re-parsed source incrementally");
        Ok(SyntaxTree::from_engine(tree))
    }
}
