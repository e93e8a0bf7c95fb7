//! Byte/point spans shared by trees, nodes and edits.
//!
//! Byte offsets coming from the engine are always trusted. Points are not:
//! changed-range computation can hand back points that disagree with the
//! byte offsets next to them, so every engine range enters the crate through
//! [`SourceRange::from_engine`], which flags such values instead of passing
//! them on as if they were sound.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Zero-based row and byte column in the source text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

impl Point {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// The point reached after writing `text` starting at `self`.
    pub fn advance(self, text: &str) -> Point {
        let mut point = self;
        let mut lines = text.split('\n');
        let Some(first) = lines.next() else {
            return point;
        };

        point.column = point.column.saturating_add(first.len());
        for line in lines {
            point.row = point.row.saturating_add(1);
            point.column = line.len();
        }

        point
    }
}

impl From<tree_sitter::Point> for Point {
    fn from(point: tree_sitter::Point) -> Self {
        Self {
            row: point.row,
            column: point.column,
        }
    }
}

impl From<Point> for tree_sitter::Point {
    fn from(point: Point) -> Self {
        tree_sitter::Point {
            row: point.row,
            column: point.column,
        }
    }
}

/// Point of the byte offset `byte` in `text`.
///
/// Offsets past the end of the text are clamped to the end.
pub fn point_at(text: &str, byte: usize) -> Point {
    let prefix = &text.as_bytes()[..byte.min(text.len())];
    let row = prefix.iter().filter(|&&b| b == b'\n').count();
    let line_start = prefix
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |newline| newline + 1);

    Point {
        row,
        column: prefix.len() - line_start,
    }
}

/// A span of source text in bytes and points.
///
/// Deserializing re-runs the point check, so a stored `points_reliable` flag
/// can only ever be downgraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "StoredRange")]
pub struct SourceRange {
    start_byte: usize,
    end_byte: usize,
    start_point: Point,
    end_point: Point,
    points_reliable: bool,
}

impl SourceRange {
    /// Create a range whose points are known to match its bytes.
    pub fn new(start_byte: usize, end_byte: usize, start_point: Point, end_point: Point) -> Self {
        Self {
            start_byte,
            end_byte,
            start_point,
            end_point,
            points_reliable: true,
        }
    }

    /// Build a range from raw engine output.
    ///
    /// Points that contradict the byte offsets are kept but marked
    /// unreliable; [`points`](Self::points) then returns `None` until the
    /// range is [reconciled](Self::reconcile) against the text.
    pub fn from_engine(range: tree_sitter::Range) -> Self {
        let start_point = Point::from(range.start_point);
        let end_point = Point::from(range.end_point);
        let points_reliable =
            points_consistent(range.start_byte, range.end_byte, start_point, end_point);

        if !points_reliable {
            tracing::warn!(
                start_byte = range.start_byte,
                end_byte = range.end_byte,
                ?start_point,
                ?end_point,
                "engine range carries points inconsistent with its bytes"
            );
        }

        Self {
            start_byte: range.start_byte,
            end_byte: range.end_byte,
            start_point,
            end_point,
            points_reliable,
        }
    }

    pub fn start_byte(&self) -> usize {
        self.start_byte
    }

    pub fn end_byte(&self) -> usize {
        self.end_byte
    }

    pub fn byte_range(&self) -> Range<usize> {
        self.start_byte..self.end_byte
    }

    pub fn is_empty(&self) -> bool {
        self.start_byte >= self.end_byte
    }

    pub fn contains_byte(&self, byte: usize) -> bool {
        self.byte_range().contains(&byte)
    }

    /// Whether the start and end points can be used as-is.
    pub fn has_reliable_points(&self) -> bool {
        self.points_reliable
    }

    /// Start and end points, or `None` if they were flagged unreliable.
    pub fn points(&self) -> Option<(Point, Point)> {
        self.points_reliable
            .then_some((self.start_point, self.end_point))
    }

    /// Points exactly as reported, reliable or not.
    pub fn raw_points(&self) -> (Point, Point) {
        (self.start_point, self.end_point)
    }

    /// Re-derive both points from `text`, keeping the byte offsets.
    pub fn reconcile(&self, text: &str) -> SourceRange {
        SourceRange::new(
            self.start_byte,
            self.end_byte,
            point_at(text, self.start_byte),
            point_at(text, self.end_byte),
        )
    }
}

#[derive(Deserialize)]
struct StoredRange {
    start_byte: usize,
    end_byte: usize,
    start_point: Point,
    end_point: Point,
    #[serde(default)]
    points_reliable: bool,
}

impl From<StoredRange> for SourceRange {
    fn from(stored: StoredRange) -> Self {
        let points_reliable = stored.points_reliable
            && points_consistent(
                stored.start_byte,
                stored.end_byte,
                stored.start_point,
                stored.end_point,
            );

        Self {
            start_byte: stored.start_byte,
            end_byte: stored.end_byte,
            start_point: stored.start_point,
            end_point: stored.end_point,
            points_reliable,
        }
    }
}

impl From<SourceRange> for Range<usize> {
    fn from(range: SourceRange) -> Self {
        range.byte_range()
    }
}

fn points_consistent(start_byte: usize, end_byte: usize, start: Point, end: Point) -> bool {
    if start_byte > end_byte || start > end {
        return false;
    }

    let len = end_byte - start_byte;
    if len == 0 {
        return start == end;
    }
    if start.row == end.row {
        return end.column - start.column == len;
    }

    // Each row crossed consumes a newline inside the span, and the end column
    // counts bytes after the last of them.
    end.row - start.row <= len && end.column < len
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn engine_range(
        start_byte: usize,
        end_byte: usize,
        start_point: (usize, usize),
        end_point: (usize, usize),
    ) -> tree_sitter::Range {
        tree_sitter::Range {
            start_byte,
            end_byte,
            start_point: tree_sitter::Point {
                row: start_point.0,
                column: start_point.1,
            },
            end_point: tree_sitter::Point {
                row: end_point.0,
                column: end_point.1,
            },
        }
    }

    #[test]
    fn point_at_counts_rows_and_byte_columns() {
        let text = "ab\ncde\n\nf";
        assert_eq!(point_at(text, 0), Point::new(0, 0));
        assert_eq!(point_at(text, 2), Point::new(0, 2));
        assert_eq!(point_at(text, 3), Point::new(1, 0));
        assert_eq!(point_at(text, 5), Point::new(1, 2));
        assert_eq!(point_at(text, 8), Point::new(3, 0));
        assert_eq!(point_at(text, 100), Point::new(3, 1));
    }

    #[test]
    fn advance_over_multiline_text() {
        let start = Point::new(2, 4);
        assert_eq!(start.advance(""), start);
        assert_eq!(start.advance("xy"), Point::new(2, 6));
        assert_eq!(start.advance("x\nyz"), Point::new(3, 2));
        assert_eq!(start.advance("\n"), Point::new(3, 0));
    }

    #[test]
    fn consistent_engine_range_is_trusted() {
        let range = SourceRange::from_engine(engine_range(3, 9, (0, 3), (1, 2)));
        assert!(range.has_reliable_points());
        assert_eq!(range.points(), Some((Point::new(0, 3), Point::new(1, 2))));
    }

    #[test]
    fn same_row_width_mismatch_is_flagged() {
        let range = SourceRange::from_engine(engine_range(4, 6, (0, 4), (0, 9)));
        assert!(!range.has_reliable_points());
        assert_eq!(range.points(), None);
        assert_eq!(range.byte_range(), 4..6);
    }

    #[test]
    fn inverted_points_are_flagged() {
        let range = SourceRange::from_engine(engine_range(0, 5, (2, 0), (1, 0)));
        assert!(!range.has_reliable_points());

        let garbage = SourceRange::from_engine(engine_range(
            0,
            1,
            (u32::MAX as usize, 0),
            (u32::MAX as usize, 0),
        ));
        assert!(!garbage.has_reliable_points());
    }

    #[test]
    fn reconcile_rederives_points_from_text() {
        let text = "[1,\n 2]";
        let broken = SourceRange::from_engine(engine_range(5, 6, (7, 7), (0, 0)));
        let fixed = broken.reconcile(text);

        assert!(fixed.has_reliable_points());
        assert_eq!(fixed.byte_range(), 5..6);
        assert_eq!(fixed.points(), Some((Point::new(1, 1), Point::new(1, 2))));
    }

    #[test]
    fn serializes_with_reliability_flag() {
        let range = SourceRange::new(1, 2, Point::new(0, 1), Point::new(0, 2));
        let json = serde_json::to_value(range).unwrap();
        assert_eq!(json["start_byte"], 1);
        assert_eq!(json["end_point"]["column"], 2);
        assert_eq!(json["points_reliable"], true);
    }

    #[test]
    fn deserialized_ranges_are_rechecked() {
        let sound = SourceRange::new(1, 2, Point::new(0, 1), Point::new(0, 2));
        let back: SourceRange =
            serde_json::from_value(serde_json::to_value(sound).unwrap()).unwrap();
        assert_eq!(back, sound);

        let forged: SourceRange = serde_json::from_value(serde_json::json!({
            "start_byte": 4,
            "end_byte": 6,
            "start_point": { "row": 0, "column": 4 },
            "end_point": { "row": 0, "column": 9 },
            "points_reliable": true,
        }))
        .unwrap();
        assert!(!forged.has_reliable_points());
        assert_eq!(forged.points(), None);
        assert_eq!(forged.byte_range(), 4..6);
    }

    proptest! {
        #[test]
        fn reconciled_ranges_pass_the_engine_check(
            text in "[a-z\n]{0,48}",
            a in 0usize..64,
            b in 0usize..64,
        ) {
            let (start, end) = (a.min(b).min(text.len()), a.max(b).min(text.len()));
            let range = SourceRange::new(start, end, Point::default(), Point::default())
                .reconcile(&text);
            let (start_point, end_point) = range.raw_points();

            prop_assert!(points_consistent(start, end, start_point, end_point));
            prop_assert_eq!(start_point.advance(&text[start..end]), end_point);
        }
    }
}
