use crate::range::{point_at, Point};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One textual mutation, replayed against a tree so its coordinates follow
/// the text without a re-parse.
///
/// Byte fields are offsets into the text before (`start_byte`,
/// `old_end_byte`) and after (`new_end_byte`) the change; points mirror them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputEdit {
    pub start_byte: usize,
    pub old_end_byte: usize,
    pub new_end_byte: usize,
    pub start_point: Point,
    pub old_end_point: Point,
    pub new_end_point: Point,
}

impl InputEdit {
    /// Insertion of `len` bytes at `byte`/`point`.
    ///
    /// Only valid when the inserted text contains no line break; use
    /// [`TextChange::apply`] for anything else.
    pub fn insertion(byte: usize, point: Point, len: usize) -> Self {
        Self {
            start_byte: byte,
            old_end_byte: byte,
            new_end_byte: byte + len,
            start_point: point,
            old_end_point: point,
            new_end_point: Point::new(point.row, point.column + len),
        }
    }

    /// Deletion of `len` bytes starting at `byte`/`point`, within one line.
    pub fn deletion(byte: usize, point: Point, len: usize) -> Self {
        Self {
            start_byte: byte,
            old_end_byte: byte + len,
            new_end_byte: byte,
            start_point: point,
            old_end_point: Point::new(point.row, point.column + len),
            new_end_point: point,
        }
    }

    /// Signed change in text length.
    pub fn byte_delta(&self) -> isize {
        self.new_end_byte as isize - self.old_end_byte as isize
    }

    pub fn is_pure_insertion(&self) -> bool {
        self.start_byte == self.old_end_byte
    }
}

impl From<InputEdit> for tree_sitter::InputEdit {
    fn from(edit: InputEdit) -> Self {
        tree_sitter::InputEdit {
            start_byte: edit.start_byte,
            old_end_byte: edit.old_end_byte,
            new_end_byte: edit.new_end_byte,
            start_position: edit.start_point.into(),
            old_end_position: edit.old_end_point.into(),
            new_end_position: edit.new_end_point.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Invalid byte range: [{byte_start}, {byte_end}) in text of length {text_len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        text_len: usize,
    },

    #[error("Byte offset {offset} is not on a UTF-8 character boundary")]
    NotCharBoundary { offset: usize },
}

/// Replacement of `[byte_start, byte_end)` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "TextChange does nothing until apply() is called"]
pub struct TextChange {
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    pub new_text: String,
}

impl TextChange {
    pub fn new(byte_start: usize, byte_end: usize, new_text: impl Into<String>) -> Self {
        Self {
            byte_start,
            byte_end,
            new_text: new_text.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::new(at, at, text)
    }

    pub fn delete(byte_start: usize, byte_end: usize) -> Self {
        Self::new(byte_start, byte_end, "")
    }

    fn validate(&self, source: &str) -> Result<(), EditError> {
        if self.byte_start > self.byte_end || self.byte_end > source.len() {
            return Err(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                text_len: source.len(),
            });
        }

        for offset in [self.byte_start, self.byte_end] {
            if !source.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary { offset });
            }
        }

        Ok(())
    }

    /// Splice the change into `source`.
    ///
    /// Returns the new text and the [`InputEdit`] describing the change in
    /// both byte and point coordinates.
    pub fn apply(&self, source: &str) -> Result<(String, InputEdit), EditError> {
        self.validate(source)?;

        let mut new_text = String::with_capacity(
            source.len() + self.new_text.len() - (self.byte_end - self.byte_start),
        );
        new_text.push_str(&source[..self.byte_start]);
        new_text.push_str(&self.new_text);
        new_text.push_str(&source[self.byte_end..]);

        let start_point = point_at(source, self.byte_start);
        let edit = InputEdit {
            start_byte: self.byte_start,
            old_end_byte: self.byte_end,
            new_end_byte: self.byte_start + self.new_text.len(),
            start_point,
            old_end_point: start_point.advance(&source[self.byte_start..self.byte_end]),
            new_end_point: start_point.advance(&self.new_text),
        };

        Ok((new_text, edit))
    }
}
